//! Loan domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use warung_shared::types::LoanId;

/// A loan taken by the business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    /// Unique identifier.
    pub id: LoanId,
    /// Who the money came from.
    pub source: String,
    /// Free-form note.
    pub note: String,
    /// Principal at creation; fixed afterwards (except explicit edit).
    pub initial_amount: Decimal,
    /// Outstanding principal; only decreased by repayments.
    pub remaining_amount: Decimal,
    /// When the loan was received.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Loan {
    /// Returns true if any repayment has been applied.
    #[must_use]
    pub fn has_repayments(&self) -> bool {
        self.remaining_amount < self.initial_amount
    }
}
