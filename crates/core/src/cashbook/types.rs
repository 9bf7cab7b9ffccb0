//! Cash ledger entry types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use warung_shared::types::TransactionId;

/// Direction of a cash movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Money coming in.
    CashIn,
    /// Money going out.
    CashOut,
}

/// Category tag for reporting and ownership resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionCategory {
    /// Raw material or finished goods bought into stock.
    StockPurchase,
    /// Revenue from a sale (including order balance settlements).
    Sales,
    /// Operational cost attached to a production run.
    ProductionCost,
    /// General operating expense (includes loan interest).
    Operational,
    /// Deposit received for a pending order.
    Deposit,
    /// Deposit of an order that has since been completed.
    DepositSettled,
    /// Deposit forfeited by a cancelled order.
    ForfeitedDeposit,
    /// Loan principal received.
    LoanProceeds,
    /// Loan principal repaid.
    LoanRepayment,
    /// Movement between the cash and bank sub-ledgers.
    Transfer,
}

/// Which sub-ledger the money moved through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash drawer.
    Cash,
    /// Bank account.
    Bank,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cash => write!(f, "CASH"),
            Self::Bank => write!(f, "BANK"),
        }
    }
}

/// One immutable cash ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier.
    pub id: TransactionId,
    /// Direction of the movement.
    pub kind: TransactionKind,
    /// Category tag.
    pub category: TransactionCategory,
    /// Monetary amount (non-negative).
    pub amount: Decimal,
    /// Human-readable description.
    pub description: String,
    /// When the movement happened (epoch milliseconds on the wire).
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    /// Id of the entity that generated this entry, if system-owned.
    pub related_id: Option<Uuid>,
    /// Sub-ledger the money moved through.
    pub payment_method: PaymentMethod,
}

impl Transaction {
    /// Creates a cash-in entry.
    #[must_use]
    pub fn cash_in(
        category: TransactionCategory,
        amount: Decimal,
        description: String,
        created_at: DateTime<Utc>,
        related_id: Option<Uuid>,
        payment_method: PaymentMethod,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            kind: TransactionKind::CashIn,
            category,
            amount,
            description,
            created_at,
            related_id,
            payment_method,
        }
    }

    /// Creates a cash-out entry.
    #[must_use]
    pub fn cash_out(
        category: TransactionCategory,
        amount: Decimal,
        description: String,
        created_at: DateTime<Utc>,
        related_id: Option<Uuid>,
        payment_method: PaymentMethod,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            kind: TransactionKind::CashOut,
            category,
            amount,
            description,
            created_at,
            related_id,
            payment_method,
        }
    }

    /// Returns true if this entry was generated by another entity.
    ///
    /// System-owned entries must not be edited or deleted directly.
    #[must_use]
    pub const fn is_system_owned(&self) -> bool {
        self.related_id.is_some()
    }

    /// Returns the signed effect of this entry on a balance.
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionKind::CashIn => self.amount,
            TransactionKind::CashOut => -self.amount,
        }
    }
}

/// Running balances per sub-ledger, derived from the transaction log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CashPosition {
    /// Balance of the cash drawer.
    pub cash: Decimal,
    /// Balance of the bank account.
    pub bank: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_system_ownership() {
        let owned = Transaction::cash_in(
            TransactionCategory::Sales,
            dec!(100),
            "Sale: SOAP".into(),
            Utc::now(),
            Some(Uuid::now_v7()),
            PaymentMethod::Cash,
        );
        assert!(owned.is_system_owned());

        let manual = Transaction::cash_out(
            TransactionCategory::Operational,
            dec!(50),
            "Electricity".into(),
            Utc::now(),
            None,
            PaymentMethod::Bank,
        );
        assert!(!manual.is_system_owned());
    }

    #[test]
    fn test_signed_amount() {
        let income = Transaction::cash_in(
            TransactionCategory::Sales,
            dec!(80),
            "Sale".into(),
            Utc::now(),
            None,
            PaymentMethod::Cash,
        );
        assert_eq!(income.signed_amount(), dec!(80));

        let expense = Transaction::cash_out(
            TransactionCategory::Operational,
            dec!(30),
            "Rent".into(),
            Utc::now(),
            None,
            PaymentMethod::Cash,
        );
        assert_eq!(expense.signed_amount(), dec!(-30));
    }
}
