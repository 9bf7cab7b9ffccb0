//! Manufacturing runs that transform raw material into finished goods.
//!
//! A production run starts in progress with planned ingredients and
//! operational costs only; raw material is committed at completion, where
//! actual consumption is valued FIFO and rolled into the unit cost of the
//! single finished-good batch the run produces.

pub mod service;
pub mod types;

pub use service::{CompleteProductionInput, StartProductionInput, UpdateProductionInput};
pub use types::{
    Ingredient, OperationalCost, ProductionRecord, ProductionStatus, ProductionUsage,
};
