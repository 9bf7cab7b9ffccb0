//! Loan principal tracking and repayments.

pub mod service;
pub mod types;

pub use service::{AddLoanInput, EditLoanInput, RepayLoanInput};
pub use types::Loan;
