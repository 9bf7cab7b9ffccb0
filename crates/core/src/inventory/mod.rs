//! Batch cost layers and the FIFO consumption selector.
//!
//! Stock is held as chronologically ordered batches; every batch is a cost
//! layer whose units share one unit cost. Consumption always drains the
//! oldest matching batch first, which is what makes cost-of-goods-sold
//! deterministic.

pub mod batch;
pub mod fifo;
pub mod service;

#[cfg(test)]
mod fifo_props;

pub use batch::{normalize_name, Batch, BatchVariant, StockType, DEFAULT_VARIANT};
pub use fifo::{ConsumptionLine, ConsumptionPlan};
pub use service::{CreateBatchInput, EditBatchInput, VariantInput};
