//! Direct sales and deposit orders.
//!
//! Sales consume finished-good stock FIFO and record per-batch consumption
//! entries, so edits and deletions reverse exactly. Deposit orders hold a
//! customer's down payment until completion consumes stock like a direct
//! sale, or cancellation forfeits the deposit without touching inventory.

pub mod orders;
pub mod service;
pub mod types;

pub use orders::{AddOrderInput, EditOrderInput};
pub use service::{EditSaleInput, RecordSaleInput};
pub use types::{DepositOrder, OrderStatus, SaleConsumption, SaleRecord};
