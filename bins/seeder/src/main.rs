//! Demo ledger seeder for Warung development and testing.
//!
//! Builds a small but complete ledger through engine commands (purchases,
//! a finished production run, a sale, a pending order, a loan) and saves
//! it through the configured snapshot store.
//!
//! Usage: cargo run --bin seeder

#![allow(clippy::print_stdout)]

use std::sync::Arc;

use anyhow::Context;
use chrono::{Duration, Utc};
use rust_decimal_macros::dec;

use warung_core::cashbook::PaymentMethod;
use warung_core::inventory::{CreateBatchInput, StockType};
use warung_core::loan::AddLoanInput;
use warung_core::production::{
    CompleteProductionInput, Ingredient, OperationalCost, StartProductionInput,
};
use warung_core::sales::{AddOrderInput, RecordSaleInput};
use warung_core::{Command, LedgerState, Receipt};
use warung_shared::config::PersistenceBackend;
use warung_shared::AppConfig;
use warung_store::{FileStore, PostgresStore, SnapshotStore};

fn apply(state: LedgerState, command: Command) -> anyhow::Result<(LedgerState, Receipt)> {
    let applied = state.apply(command)?;
    Ok((applied.state, applied.receipt))
}

#[allow(clippy::too_many_lines)]
fn build_demo_ledger() -> anyhow::Result<LedgerState> {
    let week_ago = Utc::now() - Duration::days(7);
    let state = LedgerState::default();

    // Raw material purchases (two cost layers of the same material).
    let (state, _) = apply(
        state,
        Command::CreateBatch(CreateBatchInput {
            product_name: "coconut oil".into(),
            stock_type: StockType::RawMaterial,
            quantity: dec!(40),
            variants: vec![],
            unit_cost: dec!(3),
            created_at: week_ago,
            payment_method: PaymentMethod::Cash,
        }),
    )?;
    let (state, _) = apply(
        state,
        Command::CreateBatch(CreateBatchInput {
            product_name: "coconut oil".into(),
            stock_type: StockType::RawMaterial,
            quantity: dec!(40),
            variants: vec![],
            unit_cost: dec!(4),
            created_at: week_ago + Duration::days(1),
            payment_method: PaymentMethod::Bank,
        }),
    )?;

    // A production run, completed into sellable stock.
    let (state, receipt) = apply(
        state,
        Command::StartProduction(StartProductionInput {
            output_product_name: "bar soap".into(),
            target_quantity: dec!(100),
            planned_ingredients: vec![Ingredient {
                product_name: "coconut oil".into(),
                quantity: dec!(50),
            }],
            operational_costs: vec![OperationalCost {
                description: "labor".into(),
                amount: dec!(60),
                payment_method: PaymentMethod::Cash,
            }],
            created_at: week_ago + Duration::days(2),
        }),
    )?;
    let Receipt::ProductionStarted(production_id) = receipt else {
        anyhow::bail!("expected ProductionStarted receipt");
    };
    let (state, _) = apply(
        state,
        Command::CompleteProduction {
            id: production_id,
            input: CompleteProductionInput {
                actual_quantity: dec!(100),
                actual_ingredients: vec![Ingredient {
                    product_name: "coconut oil".into(),
                    quantity: dec!(50),
                }],
                output_variants: vec![],
                completed_at: week_ago + Duration::days(3),
            },
        },
    )?;

    // A direct sale off the new stock.
    let (state, _) = apply(
        state,
        Command::RecordSale(RecordSaleInput {
            product_name: "bar soap".into(),
            variant_label: None,
            quantity: dec!(12),
            sale_price: dec!(5),
            created_at: week_ago + Duration::days(4),
            payment_method: PaymentMethod::Cash,
        }),
    )?;

    // A pending deposit order and some financing.
    let (state, _) = apply(
        state,
        Command::AddOrder(AddOrderInput {
            customer_name: "Warung Makmur".into(),
            product_name: "bar soap".into(),
            quantity: dec!(30),
            total_amount: dec!(150),
            deposit_amount: dec!(50),
            created_at: week_ago + Duration::days(5),
            payment_method: PaymentMethod::Cash,
        }),
    )?;
    let (state, _) = apply(
        state,
        Command::AddLoan(AddLoanInput {
            source: "Village cooperative".into(),
            note: "Working capital".into(),
            initial_amount: dec!(1000),
            created_at: week_ago,
            payment_method: PaymentMethod::Bank,
        }),
    )?;

    Ok(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let store: Arc<dyn SnapshotStore> = match config.persistence.backend {
        PersistenceBackend::File => Arc::new(FileStore::new(&config.persistence.snapshot_path)),
        PersistenceBackend::Postgres => {
            let url = config
                .persistence
                .database_url
                .as_deref()
                .context("persistence.database_url required for the postgres backend")?;
            Arc::new(PostgresStore::connect(url).await?)
        }
    };

    if store.load().await?.is_some() {
        println!("A snapshot already exists; refusing to overwrite it.");
        return Ok(());
    }

    println!("Building demo ledger...");
    let state = build_demo_ledger()?;
    println!(
        "  {} batches, {} productions, {} sales, {} orders, {} loans, {} transactions",
        state.batches.len(),
        state.productions.len(),
        state.sales.len(),
        state.orders.len(),
        state.loans.len(),
        state.transactions.len()
    );

    store.save(&state).await?;
    println!("Seeding complete!");
    Ok(())
}
