//! Property-based tests for the FIFO consumption planner.
//!
//! - Conservation: committing a plan removes exactly what was requested
//! - Attribution: planned cost is the sum of per-line quantity x cost
//! - Ordering: older layers are always drained before newer ones
//! - Atomicity: a shortfall yields no plan at all

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::batch::{Batch, BatchVariant, StockType, DEFAULT_VARIANT};
use super::fifo::{commit_consumption, plan_consumption};
use crate::error::EngineError;
use warung_shared::types::BatchId;

/// Strategy for a single cost layer: (quantity, unit cost, timestamp).
fn layer() -> impl Strategy<Value = (u32, u32, i64)> {
    (1u32..200, 1u32..50, 0i64..1_000_000)
}

/// Builds batches of one product from generated layers.
fn build_batches(layers: &[(u32, u32, i64)]) -> Vec<Batch> {
    layers
        .iter()
        .enumerate()
        .map(|(seq, &(qty, cost, at))| Batch {
            id: BatchId::new(),
            product_name: "WIDGET".to_string(),
            stock_type: StockType::FinishedGood,
            variants: vec![BatchVariant {
                label: DEFAULT_VARIANT.to_string(),
                quantity: Decimal::from(qty),
            }],
            initial_quantity: Decimal::from(qty),
            unit_cost: Decimal::from(cost),
            created_at: Utc.timestamp_millis_opt(at).unwrap(),
            seq: u64::try_from(seq).unwrap(),
        })
        .collect()
}

fn total_quantity(batches: &[Batch]) -> Decimal {
    batches.iter().map(Batch::current_quantity).sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* set of layers and any affordable request, committing the
    /// plan SHALL remove exactly the requested quantity.
    #[test]
    fn prop_commit_conserves_quantity(
        layers in prop::collection::vec(layer(), 1..8),
        request in 1u32..400,
    ) {
        let mut batches = build_batches(&layers);
        let before = total_quantity(&batches);
        let requested = Decimal::from(request);
        prop_assume!(requested <= before);

        let plan = plan_consumption(
            &batches,
            "WIDGET",
            StockType::FinishedGood,
            None,
            requested,
        )
        .unwrap();
        commit_consumption(&mut batches, &plan);

        prop_assert_eq!(total_quantity(&batches), before - requested);
        let line_sum: Decimal = plan.lines.iter().map(|l| l.quantity).sum();
        prop_assert_eq!(line_sum, requested);
    }

    /// *For any* plan, the total cost SHALL equal the sum of each line's
    /// quantity times its unit cost.
    #[test]
    fn prop_cost_attribution_matches_lines(
        layers in prop::collection::vec(layer(), 1..8),
        request in 1u32..400,
    ) {
        let batches = build_batches(&layers);
        let requested = Decimal::from(request);
        prop_assume!(requested <= total_quantity(&batches));

        let plan = plan_consumption(
            &batches,
            "WIDGET",
            StockType::FinishedGood,
            None,
            requested,
        )
        .unwrap();

        let expected: Decimal = plan
            .lines
            .iter()
            .map(|l| l.quantity * l.unit_cost)
            .sum();
        prop_assert_eq!(plan.total_cost, expected);
    }

    /// *For any* plan, a batch SHALL only be drawn from after every older
    /// batch has been fully drained.
    #[test]
    fn prop_older_layers_drain_first(
        layers in prop::collection::vec(layer(), 2..8),
        request in 1u32..400,
    ) {
        let batches = build_batches(&layers);
        let requested = Decimal::from(request);
        prop_assume!(requested <= total_quantity(&batches));

        let plan = plan_consumption(
            &batches,
            "WIDGET",
            StockType::FinishedGood,
            None,
            requested,
        )
        .unwrap();

        let mut order: Vec<Batch> = batches.clone();
        order.sort_by_key(|b| (b.created_at, b.seq));
        let rank = |id: BatchId| order.iter().position(|b| b.id == id).unwrap();

        for window in plan.lines.windows(2) {
            prop_assert!(rank(window[0].batch_id) <= rank(window[1].batch_id));
        }
        // Every batch before the last one touched is fully consumed.
        if let Some(last) = plan.lines.last() {
            let last_rank = rank(last.batch_id);
            for batch in order.iter().take(last_rank) {
                let drawn: Decimal = plan
                    .lines
                    .iter()
                    .filter(|l| l.batch_id == batch.id)
                    .map(|l| l.quantity)
                    .sum();
                prop_assert_eq!(drawn, batch.current_quantity());
            }
        }
    }

    /// *For any* request exceeding total availability, planning SHALL fail
    /// with `InsufficientStock` reporting the exact availability.
    #[test]
    fn prop_shortfall_yields_no_plan(
        layers in prop::collection::vec(layer(), 1..8),
        excess in 1u32..100,
    ) {
        let batches = build_batches(&layers);
        let available = total_quantity(&batches);
        let requested = available + Decimal::from(excess);

        let result = plan_consumption(
            &batches,
            "WIDGET",
            StockType::FinishedGood,
            None,
            requested,
        );

        match result {
            Err(EngineError::InsufficientStock {
                available: reported,
                requested: wanted,
                ..
            }) => {
                prop_assert_eq!(reported, available);
                prop_assert_eq!(wanted, requested);
            }
            other => prop_assert!(false, "expected InsufficientStock, got {:?}", other),
        }
    }
}
