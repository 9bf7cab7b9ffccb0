//! Sale operations: record, edit, delete.
//!
//! Every sale stores its per-batch consumption entries, so edit and delete
//! reverse stock exactly instead of approximating. These functions mutate
//! the snapshot they are given and are intended to run through
//! [`crate::ledger::LedgerState::apply`], which supplies the all-or-nothing
//! guarantee by operating on a scratch clone.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use warung_shared::types::{SaleId, UsageId};

use super::types::{SaleConsumption, SaleRecord};
use crate::cashbook::{PaymentMethod, Transaction, TransactionCategory};
use crate::error::EngineError;
use crate::inventory::{fifo, normalize_name, StockType};
use crate::ledger::LedgerState;

/// Input for recording a direct sale.
#[derive(Debug, Clone)]
pub struct RecordSaleInput {
    /// Product sold.
    pub product_name: String,
    /// Variant sold, if the customer picked one.
    pub variant_label: Option<String>,
    /// Units sold.
    pub quantity: Decimal,
    /// Price per unit.
    pub sale_price: Decimal,
    /// Sale time.
    pub created_at: DateTime<Utc>,
    /// Sub-ledger the revenue went into.
    pub payment_method: PaymentMethod,
}

/// Partial update for a sale.
///
/// `variant_label: Some("")` (blank after trimming) clears the variant;
/// absent fields are unchanged.
#[derive(Debug, Clone, Default)]
pub struct EditSaleInput {
    /// New product name.
    pub product_name: Option<String>,
    /// New variant label; blank clears it.
    pub variant_label: Option<String>,
    /// New quantity.
    pub quantity: Option<Decimal>,
    /// New price per unit.
    pub sale_price: Option<Decimal>,
    /// New sale time.
    pub created_at: Option<DateTime<Utc>>,
}

fn normalize_variant(label: Option<&str>) -> Option<String> {
    label
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(ToString::to_string)
}

fn sale_description(product_name: &str, variant_label: Option<&str>) -> String {
    match variant_label {
        Some(label) => format!("Sale: {product_name} ({label})"),
        None => format!("Sale: {product_name}"),
    }
}

/// Records a sale: consumes finished goods FIFO, stores the per-batch
/// consumption entries, and emits the linked cash-in transaction.
pub fn record_sale(state: &mut LedgerState, input: &RecordSaleInput) -> Result<SaleId, EngineError> {
    let product_name = normalize_name(&input.product_name);
    if product_name.is_empty() {
        return Err(EngineError::EmptyProductName);
    }
    if input.quantity <= Decimal::ZERO {
        return Err(EngineError::NonPositiveQuantity);
    }
    if input.sale_price < Decimal::ZERO {
        return Err(EngineError::NegativePrice);
    }
    let variant_label = normalize_variant(input.variant_label.as_deref());

    let plan = fifo::plan_consumption(
        &state.batches,
        &product_name,
        StockType::FinishedGood,
        variant_label.as_deref(),
        input.quantity,
    )?;
    fifo::commit_consumption(&mut state.batches, &plan);

    let sale = SaleRecord {
        id: SaleId::new(),
        product_name: product_name.clone(),
        variant_label: variant_label.clone(),
        quantity: input.quantity,
        sale_price: input.sale_price,
        total_revenue: input.quantity * input.sale_price,
        total_cogs: plan.total_cost,
        created_at: input.created_at,
        related_order_id: None,
    };
    let id = sale.id;

    state
        .sale_consumptions
        .extend(plan.lines.into_iter().map(|line| SaleConsumption {
            id: UsageId::new(),
            sale_id: id,
            batch_id: line.batch_id,
            variant_label: line.variant_label,
            quantity: line.quantity,
            unit_cost: line.unit_cost,
        }));
    state.transactions.push(Transaction::cash_in(
        TransactionCategory::Sales,
        sale.total_revenue,
        sale_description(&product_name, variant_label.as_deref()),
        input.created_at,
        Some(id.into_inner()),
        input.payment_method,
    ));
    state.sales.push(sale);
    Ok(id)
}

/// Restores a sale's recorded consumption and removes the entries.
fn restore_sale_consumption(state: &mut LedgerState, id: SaleId) {
    let entries: Vec<SaleConsumption> = state
        .sale_consumptions
        .iter()
        .filter(|c| c.sale_id == id)
        .cloned()
        .collect();
    for entry in &entries {
        fifo::restore_line(
            &mut state.batches,
            entry.batch_id,
            &entry.variant_label,
            entry.quantity,
        );
    }
    state.sale_consumptions.retain(|c| c.sale_id != id);
}

/// Edits a sale: exact-restores the old consumption, re-consumes FIFO with
/// the new values, and recomputes revenue, COGS, and linked transactions.
///
/// If stock is insufficient for the new values the edit fails and the
/// snapshot the caller holds stays at its pre-edit values.
pub fn edit_sale(
    state: &mut LedgerState,
    id: SaleId,
    input: &EditSaleInput,
) -> Result<(), EngineError> {
    let old = state.sale(id).cloned().ok_or(EngineError::SaleNotFound(id))?;

    let product_name = match &input.product_name {
        Some(name) => {
            let normalized = normalize_name(name);
            if normalized.is_empty() {
                return Err(EngineError::EmptyProductName);
            }
            normalized
        }
        None => old.product_name.clone(),
    };
    let variant_label = match &input.variant_label {
        Some(label) => normalize_variant(Some(label.as_str())),
        None => old.variant_label.clone(),
    };
    let quantity = input.quantity.unwrap_or(old.quantity);
    if quantity <= Decimal::ZERO {
        return Err(EngineError::NonPositiveQuantity);
    }
    let sale_price = input.sale_price.unwrap_or(old.sale_price);
    if sale_price < Decimal::ZERO {
        return Err(EngineError::NegativePrice);
    }
    let created_at = input.created_at.unwrap_or(old.created_at);

    // 1. Undo the old consumption exactly.
    restore_sale_consumption(state, id);

    // 2. Re-consume with the new values. A shortfall aborts the whole
    //    edit; apply's scratch clone rolls the restoration back.
    let plan = fifo::plan_consumption(
        &state.batches,
        &product_name,
        StockType::FinishedGood,
        variant_label.as_deref(),
        quantity,
    )?;
    fifo::commit_consumption(&mut state.batches, &plan);
    state
        .sale_consumptions
        .extend(plan.lines.iter().map(|line| SaleConsumption {
            id: UsageId::new(),
            sale_id: id,
            batch_id: line.batch_id,
            variant_label: line.variant_label.clone(),
            quantity: line.quantity,
            unit_cost: line.unit_cost,
        }));

    // 3. Update the record and its linked transactions.
    let total_revenue = quantity * sale_price;
    let sale = state.sale_mut(id).ok_or(EngineError::SaleNotFound(id))?;
    sale.product_name = product_name.clone();
    sale.variant_label = variant_label.clone();
    sale.quantity = quantity;
    sale.sale_price = sale_price;
    sale.total_revenue = total_revenue;
    sale.total_cogs = plan.total_cost;
    sale.created_at = created_at;

    if let Some(tx) = state.transactions.iter_mut().find(|t| {
        t.related_id == Some(id.into_inner()) && t.category == TransactionCategory::Sales
    }) {
        tx.amount = total_revenue;
        tx.description = sale_description(&product_name, variant_label.as_deref());
        tx.created_at = created_at;
    }

    if let Some(order_id) = old.related_order_id {
        if let Some(order) = state.order(order_id).cloned() {
            let settlement_amount = total_revenue - order.deposit_amount;
            if let Some(tx) = state.transactions.iter_mut().find(|t| {
                t.related_id == Some(order_id.into_inner())
                    && t.category == TransactionCategory::Sales
            }) {
                tx.amount = settlement_amount;
                tx.description = format!(
                    "Order balance: {} ({product_name})",
                    order.customer_name
                );
            }
        }
    }
    Ok(())
}

/// Deletes a sale: exact-restores its consumption and removes the record,
/// its consumption entries, and its linked transaction.
///
/// A sale that settled a deposit order reverts that order to pending: the
/// settlement transaction is removed and the settled deposit becomes a
/// plain deposit again.
pub fn delete_sale(state: &mut LedgerState, id: SaleId) -> Result<(), EngineError> {
    let sale = state.sale(id).cloned().ok_or(EngineError::SaleNotFound(id))?;

    restore_sale_consumption(state, id);
    state.sales.retain(|s| s.id != id);
    state
        .transactions
        .retain(|t| t.related_id != Some(id.into_inner()));

    if let Some(order_id) = sale.related_order_id {
        let reverted = state.order_mut(order_id).map(|order| {
            order.status = super::types::OrderStatus::Pending;
            order.completed_at = None;
            (order.customer_name.clone(), order.product_name.clone())
        });
        if let Some((customer_name, product_name)) = reverted {
            state.transactions.retain(|t| {
                !(t.related_id == Some(order_id.into_inner())
                    && t.category == TransactionCategory::Sales)
            });
            for tx in state.transactions.iter_mut().filter(|t| {
                t.related_id == Some(order_id.into_inner())
                    && t.category == TransactionCategory::DepositSettled
            }) {
                tx.category = TransactionCategory::Deposit;
                tx.description = format!("Order deposit: {customer_name} ({product_name})");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::service::{create_batch, CreateBatchInput, VariantInput};
    use rust_decimal_macros::dec;

    fn seed_finished_goods(
        state: &mut LedgerState,
        name: &str,
        qty: Decimal,
        cost: Decimal,
        variants: Vec<VariantInput>,
    ) {
        create_batch(
            state,
            &CreateBatchInput {
                product_name: name.into(),
                stock_type: StockType::FinishedGood,
                quantity: qty,
                variants,
                unit_cost: cost,
                created_at: Utc::now(),
                payment_method: PaymentMethod::Cash,
            },
        )
        .unwrap();
    }

    fn sale_input(quantity: Decimal, price: Decimal) -> RecordSaleInput {
        RecordSaleInput {
            product_name: "soap".into(),
            variant_label: None,
            quantity,
            sale_price: price,
            created_at: Utc::now(),
            payment_method: PaymentMethod::Cash,
        }
    }

    #[test]
    fn test_record_sale_computes_cogs_and_revenue() {
        let mut state = LedgerState::default();
        seed_finished_goods(&mut state, "soap", dec!(10), dec!(100), vec![]);

        let id = record_sale(&mut state, &sale_input(dec!(4), dec!(200))).unwrap();

        let sale = state.sale(id).unwrap();
        assert_eq!(sale.total_cogs, dec!(400));
        assert_eq!(sale.total_revenue, dec!(800));
        assert_eq!(state.total_on_hand("SOAP", StockType::FinishedGood), dec!(6));
        assert_eq!(state.sale_consumptions.len(), 1);

        let tx = state
            .transactions
            .iter()
            .find(|t| t.related_id == Some(id.into_inner()))
            .unwrap();
        assert_eq!(tx.category, TransactionCategory::Sales);
        assert_eq!(tx.amount, dec!(800));
    }

    #[test]
    fn test_delete_sale_restores_stock_exactly() {
        let mut state = LedgerState::default();
        seed_finished_goods(&mut state, "soap", dec!(10), dec!(100), vec![]);
        let id = record_sale(&mut state, &sale_input(dec!(4), dec!(200))).unwrap();

        delete_sale(&mut state, id).unwrap();

        assert_eq!(
            state.total_on_hand("SOAP", StockType::FinishedGood),
            dec!(10)
        );
        assert!(state.sale(id).is_none());
        assert!(state.sale_consumptions.is_empty());
        assert!(
            !state
                .transactions
                .iter()
                .any(|t| t.related_id == Some(id.into_inner()))
        );
    }

    #[test]
    fn test_sale_consumes_oldest_layer_first() {
        let mut state = LedgerState::default();
        seed_finished_goods(&mut state, "soap", dec!(5), dec!(10), vec![]);
        seed_finished_goods(&mut state, "soap", dec!(5), dec!(20), vec![]);
        // Both created "now"; seq breaks the tie in insertion order.

        let id = record_sale(&mut state, &sale_input(dec!(7), dec!(50))).unwrap();

        assert_eq!(state.sale(id).unwrap().total_cogs, dec!(90));
    }

    #[test]
    fn test_edit_sale_recomputes_against_restored_stock() {
        let mut state = LedgerState::default();
        seed_finished_goods(&mut state, "soap", dec!(10), dec!(100), vec![]);
        let id = record_sale(&mut state, &sale_input(dec!(8), dec!(200))).unwrap();

        // 8 of 10 sold; editing down to 3 must succeed because the old
        // consumption is restored before re-consuming.
        edit_sale(
            &mut state,
            id,
            &EditSaleInput {
                quantity: Some(dec!(3)),
                sale_price: Some(dec!(250)),
                ..Default::default()
            },
        )
        .unwrap();

        let sale = state.sale(id).unwrap();
        assert_eq!(sale.total_revenue, dec!(750));
        assert_eq!(sale.total_cogs, dec!(300));
        assert_eq!(state.total_on_hand("SOAP", StockType::FinishedGood), dec!(7));

        let tx = state
            .transactions
            .iter()
            .find(|t| t.related_id == Some(id.into_inner()))
            .unwrap();
        assert_eq!(tx.amount, dec!(750));
    }

    #[test]
    fn test_labeled_sale_draws_from_matching_variant() {
        let mut state = LedgerState::default();
        seed_finished_goods(
            &mut state,
            "shirt",
            dec!(0),
            dec!(30),
            vec![
                VariantInput {
                    label: "RED".into(),
                    quantity: dec!(4),
                },
                VariantInput {
                    label: "BLUE".into(),
                    quantity: dec!(6),
                },
            ],
        );

        let input = RecordSaleInput {
            product_name: "shirt".into(),
            variant_label: Some("BLUE".into()),
            quantity: dec!(2),
            sale_price: dec!(80),
            created_at: Utc::now(),
            payment_method: PaymentMethod::Bank,
        };
        record_sale(&mut state, &input).unwrap();

        let batch = &state.batches[0];
        assert_eq!(batch.variant_quantity("RED"), Some(dec!(4)));
        assert_eq!(batch.variant_quantity("BLUE"), Some(dec!(4)));
        assert_eq!(batch.current_quantity(), dec!(8));
    }

    #[test]
    fn test_insufficient_stock_rejects_sale() {
        let mut state = LedgerState::default();
        seed_finished_goods(&mut state, "soap", dec!(3), dec!(100), vec![]);

        let err = record_sale(&mut state, &sale_input(dec!(5), dec!(200))).unwrap_err();
        assert!(matches!(err, EngineError::InsufficientStock { .. }));
        assert!(state.sales.is_empty());
        assert!(state.sale_consumptions.is_empty());
    }
}
