//! Loan operations: add, edit, repay, delete.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use warung_shared::types::LoanId;

use super::types::Loan;
use crate::cashbook::{PaymentMethod, Transaction, TransactionCategory};
use crate::error::EngineError;
use crate::ledger::LedgerState;

/// Input for recording a loan.
#[derive(Debug, Clone)]
pub struct AddLoanInput {
    /// Who the money came from.
    pub source: String,
    /// Free-form note.
    pub note: String,
    /// Principal received.
    pub initial_amount: Decimal,
    /// When the loan was received.
    pub created_at: DateTime<Utc>,
    /// Sub-ledger the proceeds went into.
    pub payment_method: PaymentMethod,
}

/// Partial update for a loan.
#[derive(Debug, Clone, Default)]
pub struct EditLoanInput {
    /// New source.
    pub source: Option<String>,
    /// New note.
    pub note: Option<String>,
    /// New initial amount; the difference carries onto the remaining
    /// amount (floored at zero).
    pub initial_amount: Option<Decimal>,
    /// New receipt time.
    pub created_at: Option<DateTime<Utc>>,
    /// New sub-ledger for the proceeds transaction.
    pub payment_method: Option<PaymentMethod>,
}

/// Input for repaying a loan.
#[derive(Debug, Clone)]
pub struct RepayLoanInput {
    /// Principal portion of the payment.
    pub principal: Decimal,
    /// Interest portion of the payment.
    pub interest: Decimal,
    /// Payment time.
    pub created_at: DateTime<Utc>,
    /// Sub-ledger the payment came from.
    pub payment_method: PaymentMethod,
}

/// Records a loan and the cash-in of its proceeds.
pub fn add_loan(state: &mut LedgerState, input: &AddLoanInput) -> Result<LoanId, EngineError> {
    let source = input.source.trim().to_string();
    if source.is_empty() {
        return Err(EngineError::EmptyLoanSource);
    }
    if input.initial_amount <= Decimal::ZERO {
        return Err(EngineError::NonPositiveAmount);
    }

    let loan = Loan {
        id: LoanId::new(),
        source: source.clone(),
        note: input.note.clone(),
        initial_amount: input.initial_amount,
        remaining_amount: input.initial_amount,
        created_at: input.created_at,
    };
    let id = loan.id;

    state.transactions.push(Transaction::cash_in(
        TransactionCategory::LoanProceeds,
        input.initial_amount,
        format!("Loan proceeds: {source}"),
        input.created_at,
        Some(id.into_inner()),
        input.payment_method,
    ));
    state.loans.push(loan);
    Ok(id)
}

/// Edits a loan; an initial-amount change carries onto the remaining
/// amount so recorded repayments stay accounted for.
pub fn edit_loan(
    state: &mut LedgerState,
    id: LoanId,
    input: &EditLoanInput,
) -> Result<(), EngineError> {
    let new_source = match &input.source {
        Some(source) => {
            let trimmed = source.trim().to_string();
            if trimmed.is_empty() {
                return Err(EngineError::EmptyLoanSource);
            }
            Some(trimmed)
        }
        None => None,
    };
    if input.initial_amount.is_some_and(|a| a <= Decimal::ZERO) {
        return Err(EngineError::NonPositiveAmount);
    }

    let loan = state.loan_mut(id).ok_or(EngineError::LoanNotFound(id))?;
    if let Some(source) = new_source {
        loan.source = source;
    }
    if let Some(note) = &input.note {
        loan.note = note.clone();
    }
    if let Some(new_initial) = input.initial_amount {
        let diff = new_initial - loan.initial_amount;
        loan.initial_amount = new_initial;
        loan.remaining_amount = (loan.remaining_amount + diff).max(Decimal::ZERO);
    }
    if let Some(created_at) = input.created_at {
        loan.created_at = created_at;
    }
    let (source, initial_amount, created_at) =
        (loan.source.clone(), loan.initial_amount, loan.created_at);

    if let Some(tx) = state.transactions.iter_mut().find(|t| {
        t.related_id == Some(id.into_inner()) && t.category == TransactionCategory::LoanProceeds
    }) {
        tx.amount = initial_amount;
        tx.description = format!("Loan proceeds: {source}");
        tx.created_at = created_at;
        if let Some(payment_method) = input.payment_method {
            tx.payment_method = payment_method;
        }
    }
    Ok(())
}

/// Applies a repayment: principal reduces the outstanding amount (floored
/// at zero); principal and interest each emit their own cash-out entry.
pub fn repay_loan(
    state: &mut LedgerState,
    id: LoanId,
    input: &RepayLoanInput,
) -> Result<(), EngineError> {
    if input.principal < Decimal::ZERO || input.interest < Decimal::ZERO {
        return Err(EngineError::NonPositiveAmount);
    }
    if input.principal.is_zero() && input.interest.is_zero() {
        return Err(EngineError::EmptyRepayment);
    }

    let loan = state.loan_mut(id).ok_or(EngineError::LoanNotFound(id))?;
    loan.remaining_amount = (loan.remaining_amount - input.principal).max(Decimal::ZERO);
    let source = loan.source.clone();

    if input.principal > Decimal::ZERO {
        state.transactions.push(Transaction::cash_out(
            TransactionCategory::LoanRepayment,
            input.principal,
            format!("Loan principal repayment: {source}"),
            input.created_at,
            Some(id.into_inner()),
            input.payment_method,
        ));
    }
    if input.interest > Decimal::ZERO {
        state.transactions.push(Transaction::cash_out(
            TransactionCategory::Operational,
            input.interest,
            format!("Loan interest: {source}"),
            input.created_at,
            Some(id.into_inner()),
            input.payment_method,
        ));
    }
    Ok(())
}

/// Deletes a loan and its transactions. Refused once any repayment exists.
pub fn delete_loan(state: &mut LedgerState, id: LoanId) -> Result<(), EngineError> {
    let loan = state.loan(id).ok_or(EngineError::LoanNotFound(id))?;
    if loan.has_repayments() {
        return Err(EngineError::LoanRepaid(id));
    }
    state.loans.retain(|l| l.id != id);
    state
        .transactions
        .retain(|t| t.related_id != Some(id.into_inner()));
    Ok(())
}
