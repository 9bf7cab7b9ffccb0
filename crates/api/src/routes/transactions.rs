//! Cash transaction routes: manual entries, transfers, balances.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use warung_core::cashbook::{
    CashPosition, EditTransactionInput, ManualTransactionInput, PaymentMethod, Transaction,
    TransactionCategory, TransactionKind, TransferInput,
};
use warung_core::{Command, Receipt};
use warung_shared::types::TransactionId;

use super::timestamp;
use crate::error::ApiError;
use crate::{dispatch, AppState};

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions).post(add_transaction))
        .route(
            "/transactions/{id}",
            put(update_transaction).delete(delete_transaction),
        )
        .route("/transfers", post(transfer_funds))
        .route("/transfers/{group_id}", delete(delete_transfer))
        .route("/cash-position", get(cash_position))
}

fn default_payment_method() -> PaymentMethod {
    PaymentMethod::Cash
}

/// Request body for a manual cash entry.
#[derive(Debug, Deserialize)]
pub struct AddTransactionRequest {
    /// Direction of the movement.
    pub kind: TransactionKind,
    /// Category tag.
    pub category: TransactionCategory,
    /// Amount moved.
    pub amount: Decimal,
    /// What the entry was for.
    #[serde(default)]
    pub description: String,
    /// Entry time in epoch milliseconds; defaults to now.
    #[serde(default)]
    pub created_at: Option<i64>,
    /// Sub-ledger the money moved through.
    #[serde(default = "default_payment_method")]
    pub payment_method: PaymentMethod,
}

/// Request body for editing a manual cash entry.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTransactionRequest {
    /// New direction.
    pub kind: Option<TransactionKind>,
    /// New category.
    pub category: Option<TransactionCategory>,
    /// New amount.
    pub amount: Option<Decimal>,
    /// New description.
    pub description: Option<String>,
    /// New entry time in epoch milliseconds.
    pub created_at: Option<i64>,
    /// New sub-ledger.
    pub payment_method: Option<PaymentMethod>,
}

/// Request body for a fund transfer.
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    /// Amount to move.
    pub amount: Decimal,
    /// Sub-ledger the money leaves.
    pub from: PaymentMethod,
    /// Sub-ledger the money enters.
    pub to: PaymentMethod,
    /// Free-form note.
    #[serde(default)]
    pub note: String,
    /// Transfer time in epoch milliseconds; defaults to now.
    #[serde(default)]
    pub created_at: Option<i64>,
}

async fn list_transactions(State(state): State<AppState>) -> Json<Vec<Transaction>> {
    let ledger = state.ledger.read().await;
    Json(ledger.transactions.clone())
}

async fn add_transaction(
    State(state): State<AppState>,
    Json(req): Json<AddTransactionRequest>,
) -> Result<(StatusCode, Json<Transaction>), ApiError> {
    let input = ManualTransactionInput {
        kind: req.kind,
        category: req.category,
        amount: req.amount,
        description: req.description,
        created_at: timestamp(req.created_at)?,
        payment_method: req.payment_method,
    };
    let (snapshot, receipt) = dispatch(&state, Command::AddTransaction(input)).await?;
    let Receipt::TransactionAdded(id) = receipt else {
        return Err(ApiError::internal("unexpected receipt"));
    };
    let tx = snapshot
        .transaction(id)
        .cloned()
        .ok_or_else(|| ApiError::internal("added transaction missing from snapshot"))?;
    Ok((StatusCode::CREATED, Json(tx)))
}

async fn update_transaction(
    State(state): State<AppState>,
    Path(id): Path<TransactionId>,
    Json(req): Json<UpdateTransactionRequest>,
) -> Result<Json<Transaction>, ApiError> {
    let created_at = match req.created_at {
        Some(ms) => Some(super::required_timestamp(ms)?),
        None => None,
    };
    let input = EditTransactionInput {
        kind: req.kind,
        category: req.category,
        amount: req.amount,
        description: req.description,
        created_at,
        payment_method: req.payment_method,
    };
    let (snapshot, _) = dispatch(&state, Command::EditTransaction { id, input }).await?;
    let tx = snapshot
        .transaction(id)
        .cloned()
        .ok_or_else(|| ApiError::internal("edited transaction missing from snapshot"))?;
    Ok(Json(tx))
}

async fn delete_transaction(
    State(state): State<AppState>,
    Path(id): Path<TransactionId>,
) -> Result<StatusCode, ApiError> {
    dispatch(&state, Command::DeleteTransaction(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn transfer_funds(
    State(state): State<AppState>,
    Json(req): Json<TransferRequest>,
) -> Result<(StatusCode, Json<Vec<Transaction>>), ApiError> {
    let input = TransferInput {
        amount: req.amount,
        from: req.from,
        to: req.to,
        note: req.note,
        created_at: timestamp(req.created_at)?,
    };
    let (snapshot, receipt) = dispatch(&state, Command::TransferFunds(input)).await?;
    let Receipt::TransferRecorded(group_id) = receipt else {
        return Err(ApiError::internal("unexpected receipt"));
    };
    let legs: Vec<Transaction> = snapshot
        .transactions
        .iter()
        .filter(|t| t.related_id == Some(group_id))
        .cloned()
        .collect();
    Ok((StatusCode::CREATED, Json(legs)))
}

async fn delete_transfer(
    State(state): State<AppState>,
    Path(group_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    dispatch(&state, Command::DeleteTransfer(group_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn cash_position(State(state): State<AppState>) -> Json<CashPosition> {
    let ledger = state.ledger.read().await;
    Json(ledger.cash_position())
}
