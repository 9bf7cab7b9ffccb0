//! Deposit order routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::Deserialize;
use warung_core::cashbook::PaymentMethod;
use warung_core::sales::{AddOrderInput, DepositOrder, EditOrderInput};
use warung_core::{Command, Receipt};
use warung_shared::types::OrderId;

use super::timestamp;
use crate::error::ApiError;
use crate::{dispatch, AppState};

/// Creates the deposit order routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(add_order))
        .route("/orders/{id}", put(update_order).delete(delete_order))
        .route("/orders/{id}/complete", post(complete_order))
        .route("/orders/{id}/cancel", post(cancel_order))
}

fn default_payment_method() -> PaymentMethod {
    PaymentMethod::Cash
}

/// Request body for placing an order.
#[derive(Debug, Deserialize)]
pub struct AddOrderRequest {
    /// Customer placing the order.
    pub customer_name: String,
    /// Product ordered.
    pub product_name: String,
    /// Units ordered.
    pub quantity: Decimal,
    /// Full order amount.
    pub total_amount: Decimal,
    /// Amount paid upfront.
    pub deposit_amount: Decimal,
    /// Order time in epoch milliseconds; defaults to now.
    #[serde(default)]
    pub created_at: Option<i64>,
    /// Sub-ledger the deposit went into.
    #[serde(default = "default_payment_method")]
    pub payment_method: PaymentMethod,
}

/// Request body for editing a pending order.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateOrderRequest {
    /// New customer name.
    pub customer_name: Option<String>,
    /// New product name.
    pub product_name: Option<String>,
    /// New quantity.
    pub quantity: Option<Decimal>,
    /// New total amount.
    pub total_amount: Option<Decimal>,
    /// New deposit amount.
    pub deposit_amount: Option<Decimal>,
    /// New order time in epoch milliseconds.
    pub created_at: Option<i64>,
}

/// Request body for completing an order.
#[derive(Debug, Deserialize)]
pub struct CompleteOrderRequest {
    /// Completion time in epoch milliseconds; defaults to now.
    #[serde(default)]
    pub completed_at: Option<i64>,
    /// Sub-ledger the balance settlement went into.
    #[serde(default = "default_payment_method")]
    pub payment_method: PaymentMethod,
}

/// Request body for cancelling an order.
#[derive(Debug, Default, Deserialize)]
pub struct CancelOrderRequest {
    /// Cancellation time in epoch milliseconds; defaults to now.
    #[serde(default)]
    pub cancelled_at: Option<i64>,
}

async fn list_orders(State(state): State<AppState>) -> Json<Vec<DepositOrder>> {
    let ledger = state.ledger.read().await;
    Json(ledger.orders.clone())
}

async fn add_order(
    State(state): State<AppState>,
    Json(req): Json<AddOrderRequest>,
) -> Result<(StatusCode, Json<DepositOrder>), ApiError> {
    let input = AddOrderInput {
        customer_name: req.customer_name,
        product_name: req.product_name,
        quantity: req.quantity,
        total_amount: req.total_amount,
        deposit_amount: req.deposit_amount,
        created_at: timestamp(req.created_at)?,
        payment_method: req.payment_method,
    };
    let (snapshot, receipt) = dispatch(&state, Command::AddOrder(input)).await?;
    let Receipt::OrderPlaced(id) = receipt else {
        return Err(ApiError::internal("unexpected receipt"));
    };
    let order = snapshot
        .order(id)
        .cloned()
        .ok_or_else(|| ApiError::internal("placed order missing from snapshot"))?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(req): Json<UpdateOrderRequest>,
) -> Result<Json<DepositOrder>, ApiError> {
    let created_at = match req.created_at {
        Some(ms) => Some(super::required_timestamp(ms)?),
        None => None,
    };
    let input = EditOrderInput {
        customer_name: req.customer_name,
        product_name: req.product_name,
        quantity: req.quantity,
        total_amount: req.total_amount,
        deposit_amount: req.deposit_amount,
        created_at,
    };
    let (snapshot, _) = dispatch(&state, Command::EditOrder { id, input }).await?;
    let order = snapshot
        .order(id)
        .cloned()
        .ok_or_else(|| ApiError::internal("edited order missing from snapshot"))?;
    Ok(Json(order))
}

async fn complete_order(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(req): Json<CompleteOrderRequest>,
) -> Result<Json<DepositOrder>, ApiError> {
    let command = Command::CompleteOrder {
        id,
        completed_at: timestamp(req.completed_at)?,
        payment_method: req.payment_method,
    };
    let (snapshot, _) = dispatch(&state, command).await?;
    let order = snapshot
        .order(id)
        .cloned()
        .ok_or_else(|| ApiError::internal("completed order missing from snapshot"))?;
    Ok(Json(order))
}

async fn cancel_order(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(req): Json<CancelOrderRequest>,
) -> Result<Json<DepositOrder>, ApiError> {
    let command = Command::CancelOrder {
        id,
        cancelled_at: timestamp(req.cancelled_at)?,
    };
    let (snapshot, _) = dispatch(&state, command).await?;
    let order = snapshot
        .order(id)
        .cloned()
        .ok_or_else(|| ApiError::internal("cancelled order missing from snapshot"))?;
    Ok(Json(order))
}

async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<StatusCode, ApiError> {
    dispatch(&state, Command::DeleteOrder(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
