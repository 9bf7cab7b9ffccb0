//! Production domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use warung_shared::types::{BatchId, ProductionId, UsageId};

use crate::cashbook::PaymentMethod;

/// State of a production run.
///
/// `InProgress` transitions to `Completed` exactly once; `Completed` is
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductionStatus {
    /// Started; no raw material committed yet.
    InProgress,
    /// Finished; output batch created, material consumed.
    Completed,
}

/// One ingredient line: a product name and a quantity.
///
/// Used both for the plan captured at start (quantities may be zero or
/// approximate) and for the actual consumption confirmed at completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Raw material product name.
    pub product_name: String,
    /// Quantity (planned or actual, depending on context).
    pub quantity: Decimal,
}

/// An operational cost incurred when starting a run (labor, electricity).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationalCost {
    /// What the cost was for.
    pub description: String,
    /// Amount paid.
    pub amount: Decimal,
    /// Sub-ledger the payment came from.
    pub payment_method: PaymentMethod,
}

/// A manufacturing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionRecord {
    /// Unique identifier.
    pub id: ProductionId,
    /// Product the run produces (stored upper-cased).
    pub output_product_name: String,
    /// Target quantity while in progress; actual quantity once completed.
    pub output_quantity: Decimal,
    /// Ingredients planned at start. Quantities may be zero.
    pub planned_ingredients: Vec<Ingredient>,
    /// Ingredients actually consumed; set at completion.
    pub actual_ingredients: Vec<Ingredient>,
    /// Operational costs at start, plus material cost once completed.
    pub total_cost: Decimal,
    /// Current state.
    pub status: ProductionStatus,
    /// When the run was started.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    /// When the run was completed.
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub completed_at: Option<DateTime<Utc>>,
    /// The finished-good batch the run produced.
    pub batch_id_created: Option<BatchId>,
}

impl ProductionRecord {
    /// Returns true if the run can still be edited or completed.
    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.status == ProductionStatus::InProgress
    }
}

/// One recorded draw of raw material by a production run.
///
/// Recorded at completion; production deletion restores these exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionUsage {
    /// Unique identifier.
    pub id: UsageId,
    /// The run that consumed the material.
    pub production_id: ProductionId,
    /// Batch the material came from.
    pub batch_id: BatchId,
    /// Variant the material came from.
    pub variant_label: String,
    /// Units consumed.
    pub quantity: Decimal,
    /// The batch's unit cost at consumption time.
    pub unit_cost: Decimal,
}
