//! Cashbook operations: manual entries, fund transfers, balance queries.
//!
//! Manual entries carry no `related_id` and can be freely edited or
//! deleted. System-owned entries are guarded here and only change when
//! their owning entity does.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;
use warung_shared::types::TransactionId;

use super::types::{
    CashPosition, PaymentMethod, Transaction, TransactionCategory, TransactionKind,
};
use crate::error::EngineError;
use crate::ledger::LedgerState;

/// Input for a manual cash entry.
#[derive(Debug, Clone)]
pub struct ManualTransactionInput {
    /// Direction of the movement.
    pub kind: TransactionKind,
    /// Category tag.
    pub category: TransactionCategory,
    /// Amount moved.
    pub amount: Decimal,
    /// What the entry was for.
    pub description: String,
    /// When the movement happened.
    pub created_at: DateTime<Utc>,
    /// Sub-ledger the money moved through.
    pub payment_method: PaymentMethod,
}

/// Partial update for a manual cash entry.
#[derive(Debug, Clone, Default)]
pub struct EditTransactionInput {
    /// New direction.
    pub kind: Option<TransactionKind>,
    /// New category.
    pub category: Option<TransactionCategory>,
    /// New amount.
    pub amount: Option<Decimal>,
    /// New description.
    pub description: Option<String>,
    /// New time.
    pub created_at: Option<DateTime<Utc>>,
    /// New sub-ledger.
    pub payment_method: Option<PaymentMethod>,
}

/// Input for moving funds between the cash and bank sub-ledgers.
#[derive(Debug, Clone)]
pub struct TransferInput {
    /// Amount to move.
    pub amount: Decimal,
    /// Sub-ledger the money leaves.
    pub from: PaymentMethod,
    /// Sub-ledger the money enters.
    pub to: PaymentMethod,
    /// Free-form note.
    pub note: String,
    /// Transfer time.
    pub created_at: DateTime<Utc>,
}

/// Adds a manual (user-owned) cash entry.
pub fn add_manual_transaction(
    state: &mut LedgerState,
    input: &ManualTransactionInput,
) -> Result<TransactionId, EngineError> {
    if input.amount <= Decimal::ZERO {
        return Err(EngineError::NonPositiveAmount);
    }
    let tx = Transaction {
        id: TransactionId::new(),
        kind: input.kind,
        category: input.category,
        amount: input.amount,
        description: input.description.clone(),
        created_at: input.created_at,
        related_id: None,
        payment_method: input.payment_method,
    };
    let id = tx.id;
    state.transactions.push(tx);
    Ok(id)
}

/// Edits a manual cash entry. System-owned entries are refused.
pub fn edit_transaction(
    state: &mut LedgerState,
    id: TransactionId,
    input: &EditTransactionInput,
) -> Result<(), EngineError> {
    if input.amount.is_some_and(|a| a <= Decimal::ZERO) {
        return Err(EngineError::NonPositiveAmount);
    }
    let tx = state
        .transaction_mut(id)
        .ok_or(EngineError::TransactionNotFound(id))?;
    if tx.is_system_owned() {
        return Err(EngineError::TransactionSystemOwned(id));
    }
    if let Some(kind) = input.kind {
        tx.kind = kind;
    }
    if let Some(category) = input.category {
        tx.category = category;
    }
    if let Some(amount) = input.amount {
        tx.amount = amount;
    }
    if let Some(description) = &input.description {
        tx.description = description.clone();
    }
    if let Some(created_at) = input.created_at {
        tx.created_at = created_at;
    }
    if let Some(payment_method) = input.payment_method {
        tx.payment_method = payment_method;
    }
    Ok(())
}

/// Deletes a manual cash entry. System-owned entries are refused.
pub fn delete_transaction(state: &mut LedgerState, id: TransactionId) -> Result<(), EngineError> {
    let tx = state
        .transaction(id)
        .ok_or(EngineError::TransactionNotFound(id))?;
    if tx.is_system_owned() {
        return Err(EngineError::TransactionSystemOwned(id));
    }
    state.transactions.retain(|t| t.id != id);
    Ok(())
}

/// Moves funds between sub-ledgers: one cash-out and one cash-in entry
/// sharing a transfer-group id.
pub fn transfer_funds(state: &mut LedgerState, input: &TransferInput) -> Result<Uuid, EngineError> {
    if input.amount <= Decimal::ZERO {
        return Err(EngineError::NonPositiveAmount);
    }
    if input.from == input.to {
        return Err(EngineError::SameTransferAccount);
    }
    let group_id = Uuid::now_v7();
    let note = if input.note.trim().is_empty() {
        String::new()
    } else {
        format!(" ({})", input.note.trim())
    };

    state.transactions.push(Transaction::cash_out(
        TransactionCategory::Transfer,
        input.amount,
        format!("Transfer: {} -> {}{note}", input.from, input.to),
        input.created_at,
        Some(group_id),
        input.from,
    ));
    state.transactions.push(Transaction::cash_in(
        TransactionCategory::Transfer,
        input.amount,
        format!("Transfer received from {}{note}", input.from),
        input.created_at,
        Some(group_id),
        input.to,
    ));
    Ok(group_id)
}

/// Deletes both legs of a transfer group.
pub fn delete_transfer(state: &mut LedgerState, group_id: Uuid) -> Result<(), EngineError> {
    let exists = state.transactions.iter().any(|t| {
        t.related_id == Some(group_id) && t.category == TransactionCategory::Transfer
    });
    if !exists {
        return Err(EngineError::TransferNotFound(group_id));
    }
    state
        .transactions
        .retain(|t| t.related_id != Some(group_id));
    Ok(())
}

/// Folds the transaction log into running cash and bank balances.
#[must_use]
pub fn cash_position(transactions: &[Transaction]) -> CashPosition {
    let mut position = CashPosition::default();
    for tx in transactions {
        match tx.payment_method {
            PaymentMethod::Cash => position.cash += tx.signed_amount(),
            PaymentMethod::Bank => position.bank += tx.signed_amount(),
        }
    }
    position
}
