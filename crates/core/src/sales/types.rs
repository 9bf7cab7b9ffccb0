//! Sale and deposit order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use warung_shared::types::{BatchId, OrderId, SaleId, UsageId};

/// One realized sale transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    /// Unique identifier.
    pub id: SaleId,
    /// Product sold (stored upper-cased).
    pub product_name: String,
    /// Variant sold, if the customer picked one.
    pub variant_label: Option<String>,
    /// Units sold.
    pub quantity: Decimal,
    /// Price per unit.
    pub sale_price: Decimal,
    /// `quantity * sale_price`.
    pub total_revenue: Decimal,
    /// Cost of goods sold, computed by the FIFO selector.
    pub total_cogs: Decimal,
    /// When the sale happened.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    /// The deposit order this sale settled, if any.
    pub related_order_id: Option<OrderId>,
}

/// One recorded draw of finished goods by a sale.
///
/// The per-batch breakdown makes sale reversal exact: edits and deletions
/// restore precisely the quantities that were taken, at the batches they
/// were taken from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleConsumption {
    /// Unique identifier.
    pub id: UsageId,
    /// The sale that consumed the stock.
    pub sale_id: SaleId,
    /// Batch the stock came from.
    pub batch_id: BatchId,
    /// Variant the stock came from.
    pub variant_label: String,
    /// Units consumed.
    pub quantity: Decimal,
    /// The batch's unit cost at consumption time.
    pub unit_cost: Decimal,
}

/// State of a deposit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Deposit received, stock not yet consumed.
    Pending,
    /// Fulfilled; a linked sale consumed the stock.
    Completed,
    /// Cancelled; the deposit was forfeited.
    Cancelled,
}

/// A pre-order backed by a partial upfront payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositOrder {
    /// Unique identifier.
    pub id: OrderId,
    /// Customer placing the order.
    pub customer_name: String,
    /// Product ordered (stored upper-cased).
    pub product_name: String,
    /// Units ordered.
    pub quantity: Decimal,
    /// Full order amount.
    pub total_amount: Decimal,
    /// Amount paid upfront.
    pub deposit_amount: Decimal,
    /// Current state.
    pub status: OrderStatus,
    /// When the order was placed.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    /// When the order was completed or cancelled.
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl DepositOrder {
    /// The balance still owed after the deposit.
    #[must_use]
    pub fn remaining_balance(&self) -> Decimal {
        self.total_amount - self.deposit_amount
    }
}
