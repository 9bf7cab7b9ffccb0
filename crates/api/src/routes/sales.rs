//! Sale routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::Deserialize;
use warung_core::cashbook::PaymentMethod;
use warung_core::sales::{EditSaleInput, RecordSaleInput, SaleRecord};
use warung_core::{Command, Receipt};
use warung_shared::types::SaleId;

use super::timestamp;
use crate::error::ApiError;
use crate::{dispatch, AppState};

/// Creates the sale routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sales", get(list_sales).post(record_sale))
        .route("/sales/{id}", put(update_sale).delete(delete_sale))
}

fn default_payment_method() -> PaymentMethod {
    PaymentMethod::Cash
}

/// Request body for recording a sale.
#[derive(Debug, Deserialize)]
pub struct RecordSaleRequest {
    /// Product sold.
    pub product_name: String,
    /// Variant sold, if any.
    #[serde(default)]
    pub variant_label: Option<String>,
    /// Units sold.
    pub quantity: Decimal,
    /// Price per unit.
    pub sale_price: Decimal,
    /// Sale time in epoch milliseconds; defaults to now.
    #[serde(default)]
    pub created_at: Option<i64>,
    /// Sub-ledger the revenue went into.
    #[serde(default = "default_payment_method")]
    pub payment_method: PaymentMethod,
}

/// Request body for editing a sale.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateSaleRequest {
    /// New product name.
    pub product_name: Option<String>,
    /// New variant label; blank clears it.
    pub variant_label: Option<String>,
    /// New quantity.
    pub quantity: Option<Decimal>,
    /// New price per unit.
    pub sale_price: Option<Decimal>,
    /// New sale time in epoch milliseconds.
    pub created_at: Option<i64>,
}

async fn list_sales(State(state): State<AppState>) -> Json<Vec<SaleRecord>> {
    let ledger = state.ledger.read().await;
    Json(ledger.sales.clone())
}

async fn record_sale(
    State(state): State<AppState>,
    Json(req): Json<RecordSaleRequest>,
) -> Result<(StatusCode, Json<SaleRecord>), ApiError> {
    let input = RecordSaleInput {
        product_name: req.product_name,
        variant_label: req.variant_label,
        quantity: req.quantity,
        sale_price: req.sale_price,
        created_at: timestamp(req.created_at)?,
        payment_method: req.payment_method,
    };
    let (snapshot, receipt) = dispatch(&state, Command::RecordSale(input)).await?;
    let Receipt::SaleRecorded(id) = receipt else {
        return Err(ApiError::internal("unexpected receipt"));
    };
    let sale = snapshot
        .sale(id)
        .cloned()
        .ok_or_else(|| ApiError::internal("recorded sale missing from snapshot"))?;
    Ok((StatusCode::CREATED, Json(sale)))
}

async fn update_sale(
    State(state): State<AppState>,
    Path(id): Path<SaleId>,
    Json(req): Json<UpdateSaleRequest>,
) -> Result<Json<SaleRecord>, ApiError> {
    let created_at = match req.created_at {
        Some(ms) => Some(super::required_timestamp(ms)?),
        None => None,
    };
    let input = EditSaleInput {
        product_name: req.product_name,
        variant_label: req.variant_label,
        quantity: req.quantity,
        sale_price: req.sale_price,
        created_at,
    };
    let (snapshot, _) = dispatch(&state, Command::EditSale { id, input }).await?;
    let sale = snapshot
        .sale(id)
        .cloned()
        .ok_or_else(|| ApiError::internal("edited sale missing from snapshot"))?;
    Ok(Json(sale))
}

async fn delete_sale(
    State(state): State<AppState>,
    Path(id): Path<SaleId>,
) -> Result<StatusCode, ApiError> {
    dispatch(&state, Command::DeleteSale(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
