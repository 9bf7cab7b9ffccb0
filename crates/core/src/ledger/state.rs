//! The aggregate ledger snapshot.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use warung_shared::types::{BatchId, LoanId, OrderId, ProductionId, SaleId, TransactionId};

use crate::cashbook::{CashPosition, Transaction};
use crate::inventory::{Batch, StockType};
use crate::loan::Loan;
use crate::production::{ProductionRecord, ProductionUsage};
use crate::sales::{DepositOrder, SaleConsumption, SaleRecord};

/// The complete application state: every entity collection plus the batch
/// insertion counter.
///
/// Collections are siblings under this one aggregate root; serde gives the
/// snapshot the repository round-trips (timestamps as epoch milliseconds).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LedgerState {
    /// Stock batches (cost layers).
    pub batches: Vec<Batch>,
    /// Production runs.
    pub productions: Vec<ProductionRecord>,
    /// Recorded raw-material consumption, per production run.
    pub production_usages: Vec<ProductionUsage>,
    /// Realized sales.
    pub sales: Vec<SaleRecord>,
    /// Recorded finished-good consumption, per sale.
    pub sale_consumptions: Vec<SaleConsumption>,
    /// Deposit orders.
    pub orders: Vec<DepositOrder>,
    /// Loans.
    pub loans: Vec<Loan>,
    /// Cash transaction log.
    pub transactions: Vec<Transaction>,
    /// Next batch insertion sequence number (FIFO tie-break).
    pub next_seq: u64,
}

impl LedgerState {
    /// Allocates the next batch insertion sequence number.
    pub fn allocate_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Looks up a batch by id.
    #[must_use]
    pub fn batch(&self, id: BatchId) -> Option<&Batch> {
        self.batches.iter().find(|b| b.id == id)
    }

    /// Looks up a batch by id, mutably.
    pub fn batch_mut(&mut self, id: BatchId) -> Option<&mut Batch> {
        self.batches.iter_mut().find(|b| b.id == id)
    }

    /// Looks up a production run by id.
    #[must_use]
    pub fn production(&self, id: ProductionId) -> Option<&ProductionRecord> {
        self.productions.iter().find(|p| p.id == id)
    }

    /// Looks up a production run by id, mutably.
    pub fn production_mut(&mut self, id: ProductionId) -> Option<&mut ProductionRecord> {
        self.productions.iter_mut().find(|p| p.id == id)
    }

    /// Looks up a sale by id.
    #[must_use]
    pub fn sale(&self, id: SaleId) -> Option<&SaleRecord> {
        self.sales.iter().find(|s| s.id == id)
    }

    /// Looks up a sale by id, mutably.
    pub fn sale_mut(&mut self, id: SaleId) -> Option<&mut SaleRecord> {
        self.sales.iter_mut().find(|s| s.id == id)
    }

    /// Looks up a deposit order by id.
    #[must_use]
    pub fn order(&self, id: OrderId) -> Option<&DepositOrder> {
        self.orders.iter().find(|o| o.id == id)
    }

    /// Looks up a deposit order by id, mutably.
    pub fn order_mut(&mut self, id: OrderId) -> Option<&mut DepositOrder> {
        self.orders.iter_mut().find(|o| o.id == id)
    }

    /// Looks up a loan by id.
    #[must_use]
    pub fn loan(&self, id: LoanId) -> Option<&Loan> {
        self.loans.iter().find(|l| l.id == id)
    }

    /// Looks up a loan by id, mutably.
    pub fn loan_mut(&mut self, id: LoanId) -> Option<&mut Loan> {
        self.loans.iter_mut().find(|l| l.id == id)
    }

    /// Looks up a transaction by id.
    #[must_use]
    pub fn transaction(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    /// Looks up a transaction by id, mutably.
    pub fn transaction_mut(&mut self, id: TransactionId) -> Option<&mut Transaction> {
        self.transactions.iter_mut().find(|t| t.id == id)
    }

    /// Returns true if any recorded consumption references the batch.
    #[must_use]
    pub fn batch_has_consumption(&self, id: BatchId) -> bool {
        self.production_usages.iter().any(|u| u.batch_id == id)
            || self.sale_consumptions.iter().any(|c| c.batch_id == id)
    }

    /// Total quantity on hand for a product of the given stock type.
    #[must_use]
    pub fn total_on_hand(&self, product_name: &str, stock_type: StockType) -> Decimal {
        self.batches
            .iter()
            .filter(|b| b.product_name == product_name && b.stock_type == stock_type)
            .map(Batch::current_quantity)
            .sum()
    }

    /// Running cash and bank balances derived from the transaction log.
    #[must_use]
    pub fn cash_position(&self) -> CashPosition {
        crate::cashbook::service::cash_position(&self.transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cashbook::PaymentMethod;
    use crate::inventory::service::{create_batch, CreateBatchInput};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn populated_state() -> LedgerState {
        let mut state = LedgerState::default();
        create_batch(
            &mut state,
            &CreateBatchInput {
                product_name: "flour".into(),
                stock_type: StockType::RawMaterial,
                quantity: dec!(25),
                variants: vec![],
                unit_cost: dec!(2),
                created_at: Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
                payment_method: PaymentMethod::Cash,
            },
        )
        .unwrap();
        state
    }

    #[test]
    fn test_snapshot_round_trips_through_json() {
        let state = populated_state();
        let json = serde_json::to_string(&state).unwrap();
        let loaded: LedgerState = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_timestamps_serialize_as_epoch_milliseconds() {
        let state = populated_state();
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["batches"][0]["created_at"], 1_700_000_000_000_i64);
    }

    #[test]
    fn test_allocate_seq_is_monotonic() {
        let mut state = LedgerState::default();
        assert_eq!(state.allocate_seq(), 0);
        assert_eq!(state.allocate_seq(), 1);
        assert_eq!(state.next_seq, 2);
    }
}
