//! Production run routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::Deserialize;
use warung_core::inventory::VariantInput;
use warung_core::production::{
    CompleteProductionInput, Ingredient, OperationalCost, ProductionRecord, StartProductionInput,
    UpdateProductionInput,
};
use warung_core::{Command, Receipt};
use warung_shared::types::ProductionId;

use super::timestamp;
use crate::error::ApiError;
use crate::{dispatch, AppState};

/// Creates the production routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/productions", get(list_productions).post(start_production))
        .route(
            "/productions/{id}",
            put(update_production).delete(delete_production),
        )
        .route("/productions/{id}/complete", post(complete_production))
}

/// Request body for starting a production run.
#[derive(Debug, Deserialize)]
pub struct StartProductionRequest {
    /// Product the run will produce.
    pub output_product_name: String,
    /// Target output quantity.
    pub target_quantity: Decimal,
    /// Planned ingredients; quantities may be zero.
    #[serde(default)]
    pub planned_ingredients: Vec<Ingredient>,
    /// Operational costs paid at start.
    #[serde(default)]
    pub operational_costs: Vec<OperationalCost>,
    /// Start time in epoch milliseconds; defaults to now.
    #[serde(default)]
    pub created_at: Option<i64>,
}

/// Request body for editing an in-progress run.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductionRequest {
    /// New output product name.
    pub output_product_name: Option<String>,
    /// New target quantity.
    pub target_quantity: Option<Decimal>,
    /// New ingredient plan.
    pub planned_ingredients: Option<Vec<Ingredient>>,
}

/// Request body for completing a run.
#[derive(Debug, Deserialize)]
pub struct CompleteProductionRequest {
    /// Units actually produced.
    pub actual_quantity: Decimal,
    /// Ingredients actually consumed.
    #[serde(default)]
    pub actual_ingredients: Vec<Ingredient>,
    /// Variant partitions of the output batch; quantities must sum to
    /// `actual_quantity`.
    #[serde(default)]
    pub output_variants: Vec<VariantInput>,
    /// Completion time in epoch milliseconds; defaults to now.
    #[serde(default)]
    pub completed_at: Option<i64>,
}

async fn list_productions(State(state): State<AppState>) -> Json<Vec<ProductionRecord>> {
    let ledger = state.ledger.read().await;
    Json(ledger.productions.clone())
}

async fn start_production(
    State(state): State<AppState>,
    Json(req): Json<StartProductionRequest>,
) -> Result<(StatusCode, Json<ProductionRecord>), ApiError> {
    let input = StartProductionInput {
        output_product_name: req.output_product_name,
        target_quantity: req.target_quantity,
        planned_ingredients: req.planned_ingredients,
        operational_costs: req.operational_costs,
        created_at: timestamp(req.created_at)?,
    };
    let (snapshot, receipt) = dispatch(&state, Command::StartProduction(input)).await?;
    let Receipt::ProductionStarted(id) = receipt else {
        return Err(ApiError::internal("unexpected receipt"));
    };
    let production = snapshot
        .production(id)
        .cloned()
        .ok_or_else(|| ApiError::internal("started production missing from snapshot"))?;
    Ok((StatusCode::CREATED, Json(production)))
}

async fn update_production(
    State(state): State<AppState>,
    Path(id): Path<ProductionId>,
    Json(req): Json<UpdateProductionRequest>,
) -> Result<Json<ProductionRecord>, ApiError> {
    let input = UpdateProductionInput {
        output_product_name: req.output_product_name,
        target_quantity: req.target_quantity,
        planned_ingredients: req.planned_ingredients,
    };
    let (snapshot, _) = dispatch(&state, Command::UpdateProduction { id, input }).await?;
    let production = snapshot
        .production(id)
        .cloned()
        .ok_or_else(|| ApiError::internal("edited production missing from snapshot"))?;
    Ok(Json(production))
}

async fn complete_production(
    State(state): State<AppState>,
    Path(id): Path<ProductionId>,
    Json(req): Json<CompleteProductionRequest>,
) -> Result<Json<ProductionRecord>, ApiError> {
    let input = CompleteProductionInput {
        actual_quantity: req.actual_quantity,
        actual_ingredients: req.actual_ingredients,
        output_variants: req.output_variants,
        completed_at: timestamp(req.completed_at)?,
    };
    let (snapshot, _) = dispatch(&state, Command::CompleteProduction { id, input }).await?;
    let production = snapshot
        .production(id)
        .cloned()
        .ok_or_else(|| ApiError::internal("completed production missing from snapshot"))?;
    Ok(Json(production))
}

async fn delete_production(
    State(state): State<AppState>,
    Path(id): Path<ProductionId>,
) -> Result<StatusCode, ApiError> {
    dispatch(&state, Command::DeleteProduction(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
