//! FIFO consumption planning over batch cost layers.
//!
//! Consumption is split into two phases so that multi-step operations can
//! stay all-or-nothing: `plan_consumption` is a pure function that either
//! produces a full per-batch plan or fails without touching anything, and
//! `commit_consumption` applies a plan's decrements. Committed plans are
//! recorded (production usages, sale consumptions) so reversal via
//! `restore_line` is exact, never approximated.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use warung_shared::types::BatchId;

use super::batch::{Batch, StockType, DEFAULT_VARIANT};
use crate::error::EngineError;

/// One planned draw against a single batch variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionLine {
    /// Batch the quantity is drawn from.
    pub batch_id: BatchId,
    /// Variant the quantity is drawn from (`DEFAULT` when unpartitioned).
    pub variant_label: String,
    /// Units drawn.
    pub quantity: Decimal,
    /// The batch's unit cost at consumption time.
    pub unit_cost: Decimal,
}

/// A complete consumption plan: per-batch draws plus the weighted cost.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumptionPlan {
    /// Draws in consumption order (oldest batch first).
    pub lines: Vec<ConsumptionLine>,
    /// Total cost of the planned draws.
    pub total_cost: Decimal,
}

/// Plans FIFO consumption of `quantity_needed` units of a product.
///
/// Candidate batches match the (already normalized) product name and stock
/// type and have positive availability for the requested variant. They are
/// drained oldest-first; `seq` breaks `created_at` ties. Total availability
/// is checked up front: a shortfall fails the whole request and no plan is
/// produced.
///
/// # Errors
///
/// Returns `NonPositiveQuantity` for a zero or negative request and
/// `InsufficientStock` when the matching batches cannot cover it.
pub fn plan_consumption(
    batches: &[Batch],
    product_name: &str,
    stock_type: StockType,
    variant_label: Option<&str>,
    quantity_needed: Decimal,
) -> Result<ConsumptionPlan, EngineError> {
    if quantity_needed <= Decimal::ZERO {
        return Err(EngineError::NonPositiveQuantity);
    }

    let mut candidates: Vec<&Batch> = batches
        .iter()
        .filter(|b| {
            b.product_name == product_name
                && b.stock_type == stock_type
                && b.available_for(variant_label) > Decimal::ZERO
        })
        .collect();
    candidates.sort_by_key(|b| (b.created_at, b.seq));

    let available: Decimal = candidates
        .iter()
        .map(|b| b.available_for(variant_label))
        .sum();
    if available < quantity_needed {
        return Err(EngineError::InsufficientStock {
            product_name: product_name.to_string(),
            variant_label: variant_label.map(ToString::to_string),
            available,
            requested: quantity_needed,
        });
    }

    let mut lines = Vec::new();
    let mut total_cost = Decimal::ZERO;
    let mut remaining = quantity_needed;

    for batch in candidates {
        if remaining <= Decimal::ZERO {
            break;
        }
        let take_total = batch.available_for(variant_label).min(remaining);

        match variant_label {
            Some(label) if batch.is_partitioned() => {
                lines.push(ConsumptionLine {
                    batch_id: batch.id,
                    variant_label: label.to_string(),
                    quantity: take_total,
                    unit_cost: batch.unit_cost,
                });
            }
            _ if !batch.is_partitioned() => {
                lines.push(ConsumptionLine {
                    batch_id: batch.id,
                    variant_label: DEFAULT_VARIANT.to_string(),
                    quantity: take_total,
                    unit_cost: batch.unit_cost,
                });
            }
            _ => {
                // Unlabeled request against a partitioned batch: drain
                // variants in declaration order.
                let mut rest = take_total;
                for variant in &batch.variants {
                    if rest <= Decimal::ZERO {
                        break;
                    }
                    let take = variant.quantity.min(rest);
                    if take > Decimal::ZERO {
                        lines.push(ConsumptionLine {
                            batch_id: batch.id,
                            variant_label: variant.label.clone(),
                            quantity: take,
                            unit_cost: batch.unit_cost,
                        });
                        rest -= take;
                    }
                }
            }
        }

        total_cost += take_total * batch.unit_cost;
        remaining -= take_total;
    }

    Ok(ConsumptionPlan { lines, total_cost })
}

/// Applies a plan's decrements to the batch ledger.
pub fn commit_consumption(batches: &mut [Batch], plan: &ConsumptionPlan) {
    for line in &plan.lines {
        restore_line(batches, line.batch_id, &line.variant_label, -line.quantity);
    }
}

/// Re-increments one recorded draw (negative `quantity` decrements).
///
/// Used for exact reversal of sales and production runs from their
/// recorded consumption entries. A batch that no longer exists is skipped;
/// deletion guards make that unreachable for recorded consumption.
pub fn restore_line(
    batches: &mut [Batch],
    batch_id: BatchId,
    variant_label: &str,
    quantity: Decimal,
) {
    if let Some(batch) = batches.iter_mut().find(|b| b.id == batch_id) {
        if let Some(variant) = batch
            .variants
            .iter_mut()
            .find(|v| v.label == variant_label)
        {
            variant.quantity += quantity;
        }
    }
}
