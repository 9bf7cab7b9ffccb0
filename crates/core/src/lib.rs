//! Core business logic for Warung.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain types, the FIFO valuation engine, and the
//! command-application machinery live here.
//!
//! # Modules
//!
//! - `ledger` - Aggregate snapshot state and command application
//! - `inventory` - Batch cost layers and the FIFO consumption selector
//! - `production` - Manufacturing runs that transform raw material
//! - `sales` - Direct sales and deposit orders
//! - `cashbook` - The derived cash transaction log
//! - `loan` - Loan principal tracking and repayments
//! - `error` - Engine error taxonomy

pub mod cashbook;
pub mod error;
pub mod inventory;
pub mod ledger;
pub mod loan;
pub mod production;
pub mod sales;

pub use error::{EngineError, ErrorKind};
pub use ledger::{Applied, Command, LedgerState, Receipt};
