//! Batch ledger operations: create, edit, delete.
//!
//! These functions mutate the snapshot they are given and are intended to
//! run through [`crate::ledger::LedgerState::apply`], which supplies the
//! all-or-nothing guarantee by operating on a scratch clone.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use warung_shared::types::BatchId;

use super::batch::{normalize_name, Batch, BatchVariant, StockType, DEFAULT_VARIANT};
use crate::cashbook::{PaymentMethod, Transaction, TransactionCategory};
use crate::error::EngineError;
use crate::ledger::LedgerState;

/// A requested variant partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantInput {
    /// Variant label.
    pub label: String,
    /// Units under this label.
    pub quantity: Decimal,
}

/// Input for creating a stock batch.
#[derive(Debug, Clone)]
pub struct CreateBatchInput {
    /// Product name (normalized on entry).
    pub product_name: String,
    /// Raw material or finished good.
    pub stock_type: StockType,
    /// Quantity purchased; used when `variants` is empty.
    pub quantity: Decimal,
    /// Optional variant partitions; when given, the batch quantity is
    /// their sum and `quantity` is ignored.
    pub variants: Vec<VariantInput>,
    /// Cost per unit.
    pub unit_cost: Decimal,
    /// Purchase time.
    pub created_at: DateTime<Utc>,
    /// Sub-ledger the purchase was paid from.
    pub payment_method: PaymentMethod,
}

/// Partial update for a stock batch.
///
/// When `variants` is supplied it is the source of truth: the batch's
/// initial quantity becomes the variant sum. Otherwise `quantity` (when
/// supplied) resets the batch to a single default variant of that size.
#[derive(Debug, Clone, Default)]
pub struct EditBatchInput {
    /// New product name.
    pub product_name: Option<String>,
    /// New unit cost.
    pub unit_cost: Option<Decimal>,
    /// New total quantity (collapses the batch to the default variant).
    pub quantity: Option<Decimal>,
    /// New variant partitions.
    pub variants: Option<Vec<VariantInput>>,
    /// New purchase time.
    pub created_at: Option<DateTime<Utc>>,
}

/// Validates and materializes a variant list.
///
/// An empty input list means "unpartitioned": the whole `quantity` lives
/// under the implicit default variant.
fn build_variants(
    quantity: Decimal,
    variants: &[VariantInput],
) -> Result<Vec<BatchVariant>, EngineError> {
    if variants.is_empty() {
        if quantity <= Decimal::ZERO {
            return Err(EngineError::NonPositiveQuantity);
        }
        return Ok(vec![BatchVariant {
            label: DEFAULT_VARIANT.to_string(),
            quantity,
        }]);
    }

    let mut built = Vec::with_capacity(variants.len());
    for variant in variants {
        let label = variant.label.trim().to_string();
        if label.is_empty() {
            return Err(EngineError::EmptyVariantLabel);
        }
        if built.iter().any(|v: &BatchVariant| v.label == label) {
            return Err(EngineError::DuplicateVariantLabel(label));
        }
        if variant.quantity < Decimal::ZERO {
            return Err(EngineError::NegativeVariantQuantity);
        }
        built.push(BatchVariant {
            label,
            quantity: variant.quantity,
        });
    }
    let total: Decimal = built.iter().map(|v| v.quantity).sum();
    if total <= Decimal::ZERO {
        return Err(EngineError::NonPositiveQuantity);
    }
    Ok(built)
}

/// Creates a batch and its linked stock-purchase transaction.
pub fn create_batch(
    state: &mut LedgerState,
    input: &CreateBatchInput,
) -> Result<BatchId, EngineError> {
    let product_name = normalize_name(&input.product_name);
    if product_name.is_empty() {
        return Err(EngineError::EmptyProductName);
    }
    if input.unit_cost < Decimal::ZERO {
        return Err(EngineError::NegativeUnitCost);
    }
    let variants = build_variants(input.quantity, &input.variants)?;
    let initial_quantity: Decimal = variants.iter().map(|v| v.quantity).sum();

    let batch = Batch {
        id: BatchId::new(),
        product_name: product_name.clone(),
        stock_type: input.stock_type,
        variants,
        initial_quantity,
        unit_cost: input.unit_cost,
        created_at: input.created_at,
        seq: state.allocate_seq(),
    };
    let id = batch.id;

    let purchase = Transaction::cash_out(
        TransactionCategory::StockPurchase,
        initial_quantity * input.unit_cost,
        format!("Stock purchase: {product_name}"),
        input.created_at,
        Some(id.into_inner()),
        input.payment_method,
    );

    state.batches.push(batch);
    state.transactions.push(purchase);
    Ok(id)
}

/// Applies a partial update and keeps the linked purchase transaction
/// consistent with the batch's new amount, name, and date.
pub fn edit_batch(
    state: &mut LedgerState,
    id: BatchId,
    input: &EditBatchInput,
) -> Result<(), EngineError> {
    let new_name = match &input.product_name {
        Some(name) => {
            let normalized = normalize_name(name);
            if normalized.is_empty() {
                return Err(EngineError::EmptyProductName);
            }
            Some(normalized)
        }
        None => None,
    };
    if input.unit_cost.is_some_and(|c| c < Decimal::ZERO) {
        return Err(EngineError::NegativeUnitCost);
    }
    let new_variants = match &input.variants {
        Some(variants) if !variants.is_empty() => Some(build_variants(Decimal::ZERO, variants)?),
        _ => match input.quantity {
            Some(quantity) => Some(build_variants(quantity, &[])?),
            None => None,
        },
    };

    let batch = state.batch_mut(id).ok_or(EngineError::BatchNotFound(id))?;
    if let Some(name) = new_name {
        batch.product_name = name;
    }
    if let Some(cost) = input.unit_cost {
        batch.unit_cost = cost;
    }
    if let Some(created_at) = input.created_at {
        batch.created_at = created_at;
    }
    if let Some(variants) = new_variants {
        batch.initial_quantity = variants.iter().map(|v| v.quantity).sum();
        batch.variants = variants;
    }

    let (name, amount, created_at) = (
        batch.product_name.clone(),
        batch.initial_quantity * batch.unit_cost,
        batch.created_at,
    );
    if let Some(tx) = state.transactions.iter_mut().find(|t| {
        t.related_id == Some(id.into_inner()) && t.category == TransactionCategory::StockPurchase
    }) {
        tx.amount = amount;
        tx.description = format!("Stock purchase: {name}");
        tx.created_at = created_at;
    }
    Ok(())
}

/// Deletes a batch and its linked purchase transaction.
///
/// Refused once any recorded consumption (production usage or sale
/// consumption) references the batch: a cost layer that has ever been
/// drawn from stays in the ledger.
pub fn delete_batch(state: &mut LedgerState, id: BatchId) -> Result<(), EngineError> {
    if state.batch(id).is_none() {
        return Err(EngineError::BatchNotFound(id));
    }
    if state.batch_has_consumption(id) {
        return Err(EngineError::BatchConsumed(id));
    }
    state.batches.retain(|b| b.id != id);
    state
        .transactions
        .retain(|t| t.related_id != Some(id.into_inner()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cashbook::TransactionKind;
    use rust_decimal_macros::dec;
    use warung_shared::types::{ProductionId, UsageId};

    fn create_input(quantity: Decimal, unit_cost: Decimal) -> CreateBatchInput {
        CreateBatchInput {
            product_name: "  flour ".into(),
            stock_type: StockType::RawMaterial,
            quantity,
            variants: vec![],
            unit_cost,
            created_at: Utc::now(),
            payment_method: PaymentMethod::Cash,
        }
    }

    #[test]
    fn test_create_batch_normalizes_name_and_emits_purchase() {
        let mut state = LedgerState::default();
        let id = create_batch(&mut state, &create_input(dec!(10), dec!(2))).unwrap();

        let batch = state.batch(id).unwrap();
        assert_eq!(batch.product_name, "FLOUR");
        assert_eq!(batch.current_quantity(), dec!(10));
        assert_eq!(batch.initial_quantity, dec!(10));

        assert_eq!(state.transactions.len(), 1);
        let tx = &state.transactions[0];
        assert_eq!(tx.kind, TransactionKind::CashOut);
        assert_eq!(tx.category, TransactionCategory::StockPurchase);
        assert_eq!(tx.amount, dec!(20));
        assert_eq!(tx.related_id, Some(id.into_inner()));
    }

    #[test]
    fn test_create_batch_with_variants_sums_quantities() {
        let mut state = LedgerState::default();
        let input = CreateBatchInput {
            product_name: "shirt".into(),
            stock_type: StockType::FinishedGood,
            quantity: dec!(0),
            variants: vec![
                VariantInput {
                    label: "RED".into(),
                    quantity: dec!(3),
                },
                VariantInput {
                    label: "BLUE".into(),
                    quantity: dec!(5),
                },
            ],
            unit_cost: dec!(40),
            created_at: Utc::now(),
            payment_method: PaymentMethod::Bank,
        };
        let id = create_batch(&mut state, &input).unwrap();

        let batch = state.batch(id).unwrap();
        assert!(batch.is_partitioned());
        assert_eq!(batch.initial_quantity, dec!(8));
        assert_eq!(state.transactions[0].amount, dec!(320));
    }

    #[test]
    fn test_create_batch_rejects_bad_input() {
        let mut state = LedgerState::default();
        assert!(matches!(
            create_batch(&mut state, &create_input(dec!(0), dec!(2))),
            Err(EngineError::NonPositiveQuantity)
        ));
        assert!(matches!(
            create_batch(&mut state, &create_input(dec!(1), dec!(-2))),
            Err(EngineError::NegativeUnitCost)
        ));

        let mut dup = create_input(dec!(0), dec!(2));
        dup.variants = vec![
            VariantInput {
                label: "A".into(),
                quantity: dec!(1),
            },
            VariantInput {
                label: "A".into(),
                quantity: dec!(2),
            },
        ];
        assert!(matches!(
            create_batch(&mut state, &dup),
            Err(EngineError::DuplicateVariantLabel(_))
        ));
        assert!(state.batches.is_empty());
        assert!(state.transactions.is_empty());
    }

    #[test]
    fn test_edit_batch_variants_are_source_of_truth() {
        let mut state = LedgerState::default();
        let id = create_batch(&mut state, &create_input(dec!(10), dec!(2))).unwrap();

        let edit = EditBatchInput {
            variants: Some(vec![
                VariantInput {
                    label: "SMALL".into(),
                    quantity: dec!(4),
                },
                VariantInput {
                    label: "LARGE".into(),
                    quantity: dec!(2),
                },
            ]),
            ..Default::default()
        };
        edit_batch(&mut state, id, &edit).unwrap();

        let batch = state.batch(id).unwrap();
        assert_eq!(batch.initial_quantity, dec!(6));
        assert_eq!(batch.current_quantity(), dec!(6));
        // Linked purchase follows the recomputed amount.
        assert_eq!(state.transactions[0].amount, dec!(12));
    }

    #[test]
    fn test_edit_batch_updates_purchase_description() {
        let mut state = LedgerState::default();
        let id = create_batch(&mut state, &create_input(dec!(10), dec!(2))).unwrap();

        let edit = EditBatchInput {
            product_name: Some("sugar".into()),
            unit_cost: Some(dec!(3)),
            ..Default::default()
        };
        edit_batch(&mut state, id, &edit).unwrap();

        assert_eq!(state.batch(id).unwrap().product_name, "SUGAR");
        assert_eq!(state.transactions[0].amount, dec!(30));
        assert_eq!(state.transactions[0].description, "Stock purchase: SUGAR");
    }

    #[test]
    fn test_delete_batch_removes_linked_transaction() {
        let mut state = LedgerState::default();
        let id = create_batch(&mut state, &create_input(dec!(10), dec!(2))).unwrap();

        delete_batch(&mut state, id).unwrap();
        assert!(state.batches.is_empty());
        assert!(state.transactions.is_empty());
    }

    #[test]
    fn test_delete_batch_refused_after_consumption() {
        let mut state = LedgerState::default();
        let id = create_batch(&mut state, &create_input(dec!(10), dec!(2))).unwrap();
        state.production_usages.push(crate::production::ProductionUsage {
            id: UsageId::new(),
            production_id: ProductionId::new(),
            batch_id: id,
            variant_label: DEFAULT_VARIANT.into(),
            quantity: dec!(1),
            unit_cost: dec!(2),
        });

        assert!(matches!(
            delete_batch(&mut state, id),
            Err(EngineError::BatchConsumed(_))
        ));
        assert_eq!(state.batches.len(), 1);
    }
}
