//! Property-based tests for atomic command application.
//!
//! - A failing command leaves the caller's snapshot untouched
//! - Recording and deleting a sale is a perfect round trip
//! - Conservation holds across arbitrary purchase/sale sequences

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::command::{Command, Receipt};
use super::state::LedgerState;
use crate::cashbook::PaymentMethod;
use crate::inventory::service::CreateBatchInput;
use crate::inventory::StockType;
use crate::sales::service::RecordSaleInput;

/// Strategy for a purchase layer: (quantity, unit cost).
fn purchase() -> impl Strategy<Value = (u32, u32)> {
    (1u32..100, 1u32..50)
}

fn seed_purchases(layers: &[(u32, u32)]) -> LedgerState {
    let mut state = LedgerState::default();
    for (i, &(qty, cost)) in layers.iter().enumerate() {
        let at = Utc.timestamp_millis_opt(i64::from(u32::try_from(i).unwrap()) * 1_000).unwrap();
        state = state
            .apply(Command::CreateBatch(CreateBatchInput {
                product_name: "WIDGET".to_string(),
                stock_type: StockType::FinishedGood,
                quantity: Decimal::from(qty),
                variants: vec![],
                unit_cost: Decimal::from(cost),
                created_at: at,
                payment_method: PaymentMethod::Cash,
            }))
            .unwrap()
            .state;
    }
    state
}

fn sale(quantity: Decimal) -> Command {
    Command::RecordSale(RecordSaleInput {
        product_name: "WIDGET".to_string(),
        variant_label: None,
        quantity,
        sale_price: Decimal::from(10),
        created_at: Utc.timestamp_millis_opt(9_000_000).unwrap(),
        payment_method: PaymentMethod::Cash,
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// *For any* stocked ledger and any overdrawing sale, apply SHALL fail
    /// and the snapshot SHALL be byte-for-byte reusable.
    #[test]
    fn prop_overdraw_is_all_or_nothing(
        layers in prop::collection::vec(purchase(), 1..6),
        excess in 1u32..50,
    ) {
        let state = seed_purchases(&layers);
        let on_hand = state.total_on_hand("WIDGET", StockType::FinishedGood);
        let snapshot = state.clone();

        let result = state.apply(sale(on_hand + Decimal::from(excess)));

        prop_assert!(result.is_err());
        prop_assert_eq!(state, snapshot);
    }

    /// *For any* affordable sale, deleting it SHALL restore the exact
    /// pre-sale snapshot.
    #[test]
    fn prop_sale_delete_round_trips(
        layers in prop::collection::vec(purchase(), 1..6),
        request in 1u32..300,
    ) {
        let state = seed_purchases(&layers);
        let requested = Decimal::from(request);
        prop_assume!(requested <= state.total_on_hand("WIDGET", StockType::FinishedGood));

        let applied = state.apply(sale(requested)).unwrap();
        let Receipt::SaleRecorded(sale_id) = applied.receipt else {
            panic!("expected SaleRecorded");
        };
        let after_delete = applied
            .state
            .apply(Command::DeleteSale(sale_id))
            .unwrap()
            .state;

        prop_assert_eq!(after_delete, state);
    }

    /// *For any* sequence of affordable sales, on-hand quantity SHALL be
    /// purchases minus net quantity sold.
    #[test]
    fn prop_conservation_over_sales(
        layers in prop::collection::vec(purchase(), 1..6),
        requests in prop::collection::vec(1u32..40, 1..6),
    ) {
        let mut state = seed_purchases(&layers);
        let purchased = state.total_on_hand("WIDGET", StockType::FinishedGood);

        let mut sold = Decimal::ZERO;
        for &request in &requests {
            let requested = Decimal::from(request);
            match state.apply(sale(requested)) {
                Ok(applied) => {
                    state = applied.state;
                    sold += requested;
                }
                Err(_) => {
                    // Overdraw attempts change nothing; keep selling.
                }
            }
            prop_assert_eq!(
                state.total_on_hand("WIDGET", StockType::FinishedGood),
                purchased - sold
            );
        }
    }
}
