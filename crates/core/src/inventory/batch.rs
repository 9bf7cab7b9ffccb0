//! Batch (cost layer) domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use warung_shared::types::BatchId;

/// Label of the implicit variant carried by unpartitioned batches.
///
/// Every batch holds at least one variant; when the caller does not care
/// about sub-labels the whole quantity lives under this one. That keeps
/// `current_quantity` a plain derived sum in all cases.
pub const DEFAULT_VARIANT: &str = "DEFAULT";

/// Normalizes a product name to its stored form (trimmed, upper-cased).
///
/// Product grouping is case-insensitive by convention; normalizing at every
/// entry point keeps comparisons plain string equality.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.trim().to_uppercase()
}

/// What a batch's stock is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockType {
    /// Raw material, consumed by production runs.
    RawMaterial,
    /// Finished goods, consumed by sales.
    FinishedGood,
}

/// A named sub-partition of a batch's quantity (e.g. size or color).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchVariant {
    /// Variant label, unique within the batch.
    pub label: String,
    /// Units currently remaining under this label.
    pub quantity: Decimal,
}

/// A chronologically ordered cost layer of stock.
///
/// All units in a batch share one unit cost and one creation date. Batches
/// of the same product are consumed oldest-first; `seq` breaks ties between
/// identical `created_at` values so consumption order stays deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    /// Unique identifier.
    pub id: BatchId,
    /// Grouping key, stored upper-cased.
    pub product_name: String,
    /// Raw material or finished good; never both.
    pub stock_type: StockType,
    /// Sub-partitions of the remaining quantity. Never empty.
    pub variants: Vec<BatchVariant>,
    /// Quantity the batch was created with.
    pub initial_quantity: Decimal,
    /// Cost per unit, fixed at batch creation.
    pub unit_cost: Decimal,
    /// Creation time; defines FIFO order among batches of one product.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    /// Insertion sequence; FIFO tie-break for equal `created_at`.
    pub seq: u64,
}

impl Batch {
    /// Remaining quantity, always the sum of variant quantities.
    #[must_use]
    pub fn current_quantity(&self) -> Decimal {
        self.variants.iter().map(|v| v.quantity).sum()
    }

    /// Returns true if the batch has real sub-partitions (anything other
    /// than the single implicit default variant).
    #[must_use]
    pub fn is_partitioned(&self) -> bool {
        !(self.variants.len() == 1 && self.variants[0].label == DEFAULT_VARIANT)
    }

    /// Quantity available to a request for the given variant.
    ///
    /// A labeled request against a partitioned batch sees only that
    /// variant's quantity (zero when the label is absent). A labeled
    /// request against an unpartitioned batch, like an unlabeled request,
    /// sees the whole remaining quantity.
    #[must_use]
    pub fn available_for(&self, variant_label: Option<&str>) -> Decimal {
        match variant_label {
            Some(label) if self.is_partitioned() => self
                .variants
                .iter()
                .find(|v| v.label == label)
                .map_or(Decimal::ZERO, |v| v.quantity),
            _ => self.current_quantity(),
        }
    }

    /// Units consumed from this batch so far.
    #[must_use]
    pub fn consumed_quantity(&self) -> Decimal {
        self.initial_quantity - self.current_quantity()
    }

    /// Looks up a variant quantity by label.
    #[must_use]
    pub fn variant_quantity(&self, label: &str) -> Option<Decimal> {
        self.variants
            .iter()
            .find(|v| v.label == label)
            .map(|v| v.quantity)
    }
}
