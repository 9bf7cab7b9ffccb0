//! Loan routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::Deserialize;
use warung_core::cashbook::PaymentMethod;
use warung_core::loan::{AddLoanInput, EditLoanInput, Loan, RepayLoanInput};
use warung_core::{Command, Receipt};
use warung_shared::types::LoanId;

use super::timestamp;
use crate::error::ApiError;
use crate::{dispatch, AppState};

/// Creates the loan routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/loans", get(list_loans).post(add_loan))
        .route("/loans/{id}", put(update_loan).delete(delete_loan))
        .route("/loans/{id}/repayments", post(repay_loan))
}

fn default_payment_method() -> PaymentMethod {
    PaymentMethod::Cash
}

/// Request body for recording a loan.
#[derive(Debug, Deserialize)]
pub struct AddLoanRequest {
    /// Who the money came from.
    pub source: String,
    /// Free-form note.
    #[serde(default)]
    pub note: String,
    /// Principal received.
    pub initial_amount: Decimal,
    /// Receipt time in epoch milliseconds; defaults to now.
    #[serde(default)]
    pub created_at: Option<i64>,
    /// Sub-ledger the proceeds went into.
    #[serde(default = "default_payment_method")]
    pub payment_method: PaymentMethod,
}

/// Request body for editing a loan.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateLoanRequest {
    /// New source.
    pub source: Option<String>,
    /// New note.
    pub note: Option<String>,
    /// New initial amount.
    pub initial_amount: Option<Decimal>,
    /// New receipt time in epoch milliseconds.
    pub created_at: Option<i64>,
    /// New sub-ledger for the proceeds transaction.
    pub payment_method: Option<PaymentMethod>,
}

/// Request body for a repayment.
#[derive(Debug, Deserialize)]
pub struct RepayLoanRequest {
    /// Principal portion.
    #[serde(default)]
    pub principal: Decimal,
    /// Interest portion.
    #[serde(default)]
    pub interest: Decimal,
    /// Payment time in epoch milliseconds; defaults to now.
    #[serde(default)]
    pub created_at: Option<i64>,
    /// Sub-ledger the payment came from.
    #[serde(default = "default_payment_method")]
    pub payment_method: PaymentMethod,
}

async fn list_loans(State(state): State<AppState>) -> Json<Vec<Loan>> {
    let ledger = state.ledger.read().await;
    Json(ledger.loans.clone())
}

async fn add_loan(
    State(state): State<AppState>,
    Json(req): Json<AddLoanRequest>,
) -> Result<(StatusCode, Json<Loan>), ApiError> {
    let input = AddLoanInput {
        source: req.source,
        note: req.note,
        initial_amount: req.initial_amount,
        created_at: timestamp(req.created_at)?,
        payment_method: req.payment_method,
    };
    let (snapshot, receipt) = dispatch(&state, Command::AddLoan(input)).await?;
    let Receipt::LoanAdded(id) = receipt else {
        return Err(ApiError::internal("unexpected receipt"));
    };
    let loan = snapshot
        .loan(id)
        .cloned()
        .ok_or_else(|| ApiError::internal("added loan missing from snapshot"))?;
    Ok((StatusCode::CREATED, Json(loan)))
}

async fn update_loan(
    State(state): State<AppState>,
    Path(id): Path<LoanId>,
    Json(req): Json<UpdateLoanRequest>,
) -> Result<Json<Loan>, ApiError> {
    let created_at = match req.created_at {
        Some(ms) => Some(super::required_timestamp(ms)?),
        None => None,
    };
    let input = EditLoanInput {
        source: req.source,
        note: req.note,
        initial_amount: req.initial_amount,
        created_at,
        payment_method: req.payment_method,
    };
    let (snapshot, _) = dispatch(&state, Command::EditLoan { id, input }).await?;
    let loan = snapshot
        .loan(id)
        .cloned()
        .ok_or_else(|| ApiError::internal("edited loan missing from snapshot"))?;
    Ok(Json(loan))
}

async fn repay_loan(
    State(state): State<AppState>,
    Path(id): Path<LoanId>,
    Json(req): Json<RepayLoanRequest>,
) -> Result<Json<Loan>, ApiError> {
    let input = RepayLoanInput {
        principal: req.principal,
        interest: req.interest,
        created_at: timestamp(req.created_at)?,
        payment_method: req.payment_method,
    };
    let (snapshot, _) = dispatch(&state, Command::RepayLoan { id, input }).await?;
    let loan = snapshot
        .loan(id)
        .cloned()
        .ok_or_else(|| ApiError::internal("repaid loan missing from snapshot"))?;
    Ok(Json(loan))
}

async fn delete_loan(
    State(state): State<AppState>,
    Path(id): Path<LoanId>,
) -> Result<StatusCode, ApiError> {
    dispatch(&state, Command::DeleteLoan(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
