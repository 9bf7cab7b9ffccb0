//! Stock batch routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use warung_core::cashbook::PaymentMethod;
use warung_core::inventory::{Batch, CreateBatchInput, EditBatchInput, StockType, VariantInput};
use warung_core::{Command, Receipt};
use warung_shared::types::BatchId;

use super::timestamp;
use crate::error::ApiError;
use crate::{dispatch, AppState};

/// Creates the batch routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/batches", get(list_batches).post(create_batch))
        .route("/batches/{id}", put(update_batch).delete(delete_batch))
}

fn default_payment_method() -> PaymentMethod {
    PaymentMethod::Cash
}

/// Request body for creating a batch.
#[derive(Debug, Deserialize)]
pub struct CreateBatchRequest {
    /// Product name.
    pub product_name: String,
    /// Raw material or finished good.
    pub stock_type: StockType,
    /// Quantity purchased (used when `variants` is empty).
    #[serde(default)]
    pub quantity: Decimal,
    /// Optional variant partitions.
    #[serde(default)]
    pub variants: Vec<VariantInput>,
    /// Cost per unit.
    pub unit_cost: Decimal,
    /// Purchase time in epoch milliseconds; defaults to now.
    #[serde(default)]
    pub created_at: Option<i64>,
    /// Sub-ledger the purchase was paid from.
    #[serde(default = "default_payment_method")]
    pub payment_method: PaymentMethod,
}

/// Request body for editing a batch.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateBatchRequest {
    /// New product name.
    pub product_name: Option<String>,
    /// New unit cost.
    pub unit_cost: Option<Decimal>,
    /// New total quantity.
    pub quantity: Option<Decimal>,
    /// New variant partitions.
    pub variants: Option<Vec<VariantInput>>,
    /// New purchase time in epoch milliseconds.
    pub created_at: Option<i64>,
}

/// Response for a batch, with the derived remaining quantity.
#[derive(Debug, Serialize)]
pub struct BatchResponse {
    /// The batch itself.
    #[serde(flatten)]
    pub batch: Batch,
    /// Remaining quantity (sum of variant quantities).
    pub current_quantity: Decimal,
}

impl From<Batch> for BatchResponse {
    fn from(batch: Batch) -> Self {
        let current_quantity = batch.current_quantity();
        Self {
            batch,
            current_quantity,
        }
    }
}

async fn list_batches(State(state): State<AppState>) -> Json<Vec<BatchResponse>> {
    let ledger = state.ledger.read().await;
    Json(
        ledger
            .batches
            .iter()
            .cloned()
            .map(BatchResponse::from)
            .collect(),
    )
}

async fn create_batch(
    State(state): State<AppState>,
    Json(req): Json<CreateBatchRequest>,
) -> Result<(StatusCode, Json<BatchResponse>), ApiError> {
    let input = CreateBatchInput {
        product_name: req.product_name,
        stock_type: req.stock_type,
        quantity: req.quantity,
        variants: req.variants,
        unit_cost: req.unit_cost,
        created_at: timestamp(req.created_at)?,
        payment_method: req.payment_method,
    };
    let (snapshot, receipt) = dispatch(&state, Command::CreateBatch(input)).await?;
    let Receipt::BatchCreated(id) = receipt else {
        return Err(ApiError::internal("unexpected receipt"));
    };
    let batch = snapshot
        .batch(id)
        .cloned()
        .ok_or_else(|| ApiError::internal("created batch missing from snapshot"))?;
    Ok((StatusCode::CREATED, Json(batch.into())))
}

async fn update_batch(
    State(state): State<AppState>,
    Path(id): Path<BatchId>,
    Json(req): Json<UpdateBatchRequest>,
) -> Result<Json<BatchResponse>, ApiError> {
    let created_at = match req.created_at {
        Some(ms) => Some(super::required_timestamp(ms)?),
        None => None,
    };
    let input = EditBatchInput {
        product_name: req.product_name,
        unit_cost: req.unit_cost,
        quantity: req.quantity,
        variants: req.variants,
        created_at,
    };
    let (snapshot, _) = dispatch(&state, Command::EditBatch { id, input }).await?;
    let batch = snapshot
        .batch(id)
        .cloned()
        .ok_or_else(|| ApiError::internal("edited batch missing from snapshot"))?;
    Ok(Json(batch.into()))
}

async fn delete_batch(
    State(state): State<AppState>,
    Path(id): Path<BatchId>,
) -> Result<StatusCode, ApiError> {
    dispatch(&state, Command::DeleteBatch(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
