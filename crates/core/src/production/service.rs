//! Production run operations: start, update, complete, delete.
//!
//! These functions mutate the snapshot they are given and are intended to
//! run through [`crate::ledger::LedgerState::apply`], which supplies the
//! all-or-nothing guarantee by operating on a scratch clone.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use warung_shared::types::{BatchId, ProductionId, UsageId};

use super::types::{
    Ingredient, OperationalCost, ProductionRecord, ProductionStatus, ProductionUsage,
};
use crate::cashbook::{Transaction, TransactionCategory};
use crate::error::EngineError;
use crate::inventory::service::VariantInput;
use crate::inventory::{fifo, normalize_name, Batch, BatchVariant, StockType, DEFAULT_VARIANT};
use crate::ledger::LedgerState;

/// Input for starting a production run.
#[derive(Debug, Clone)]
pub struct StartProductionInput {
    /// Product the run will produce.
    pub output_product_name: String,
    /// Target output quantity (revised at completion).
    pub target_quantity: Decimal,
    /// Planned ingredients; quantities may be zero or approximate.
    pub planned_ingredients: Vec<Ingredient>,
    /// Operational costs paid at start.
    pub operational_costs: Vec<OperationalCost>,
    /// Start time.
    pub created_at: DateTime<Utc>,
}

/// Partial update for an in-progress production run.
#[derive(Debug, Clone, Default)]
pub struct UpdateProductionInput {
    /// New output product name.
    pub output_product_name: Option<String>,
    /// New target quantity.
    pub target_quantity: Option<Decimal>,
    /// New ingredient plan.
    pub planned_ingredients: Option<Vec<Ingredient>>,
}

/// Input for completing a production run.
#[derive(Debug, Clone)]
pub struct CompleteProductionInput {
    /// Units actually produced.
    pub actual_quantity: Decimal,
    /// Ingredients actually consumed.
    pub actual_ingredients: Vec<Ingredient>,
    /// Variant partitions of the output batch.
    ///
    /// Pre-condition (validated by the caller): quantities sum to
    /// `actual_quantity`.
    pub output_variants: Vec<VariantInput>,
    /// Completion time.
    pub completed_at: DateTime<Utc>,
}

/// Normalizes and validates an ingredient list (negative quantities are
/// rejected; zero is a legitimate "still unknown" plan entry).
fn normalize_ingredients(ingredients: &[Ingredient]) -> Result<Vec<Ingredient>, EngineError> {
    let mut normalized = Vec::with_capacity(ingredients.len());
    for ingredient in ingredients {
        let product_name = normalize_name(&ingredient.product_name);
        if product_name.is_empty() {
            return Err(EngineError::EmptyProductName);
        }
        if ingredient.quantity < Decimal::ZERO {
            return Err(EngineError::NonPositiveQuantity);
        }
        normalized.push(Ingredient {
            product_name,
            quantity: ingredient.quantity,
        });
    }
    Ok(normalized)
}

/// Starts a production run.
///
/// No raw material is committed here; planned ingredient quantities may be
/// zero and are confirmed at completion. Each positive operational cost
/// emits one cash-out transaction linked to the run.
pub fn start_production(
    state: &mut LedgerState,
    input: &StartProductionInput,
) -> Result<ProductionId, EngineError> {
    let output_product_name = normalize_name(&input.output_product_name);
    if output_product_name.is_empty() {
        return Err(EngineError::EmptyProductName);
    }
    if input.target_quantity <= Decimal::ZERO {
        return Err(EngineError::NonPositiveQuantity);
    }
    if input
        .operational_costs
        .iter()
        .any(|c| c.amount < Decimal::ZERO)
    {
        return Err(EngineError::NonPositiveAmount);
    }
    let planned_ingredients = normalize_ingredients(&input.planned_ingredients)?;

    let total_cost: Decimal = input.operational_costs.iter().map(|c| c.amount).sum();
    let production = ProductionRecord {
        id: ProductionId::new(),
        output_product_name: output_product_name.clone(),
        output_quantity: input.target_quantity,
        planned_ingredients,
        actual_ingredients: Vec::new(),
        total_cost,
        status: ProductionStatus::InProgress,
        created_at: input.created_at,
        completed_at: None,
        batch_id_created: None,
    };
    let id = production.id;

    for cost in input
        .operational_costs
        .iter()
        .filter(|c| c.amount > Decimal::ZERO)
    {
        state.transactions.push(Transaction::cash_out(
            TransactionCategory::ProductionCost,
            cost.amount,
            format!("Production {output_product_name} ({})", cost.description),
            input.created_at,
            Some(id.into_inner()),
            cost.payment_method,
        ));
    }
    state.productions.push(production);
    Ok(id)
}

/// Edits an in-progress run. No inventory side effects.
pub fn update_production(
    state: &mut LedgerState,
    id: ProductionId,
    input: &UpdateProductionInput,
) -> Result<(), EngineError> {
    let new_name = match &input.output_product_name {
        Some(name) => {
            let normalized = normalize_name(name);
            if normalized.is_empty() {
                return Err(EngineError::EmptyProductName);
            }
            Some(normalized)
        }
        None => None,
    };
    if input.target_quantity.is_some_and(|q| q <= Decimal::ZERO) {
        return Err(EngineError::NonPositiveQuantity);
    }
    let new_plan = match &input.planned_ingredients {
        Some(ingredients) => Some(normalize_ingredients(ingredients)?),
        None => None,
    };

    let production = state
        .production_mut(id)
        .ok_or(EngineError::ProductionNotFound(id))?;
    if !production.is_in_progress() {
        return Err(EngineError::ProductionNotEditable(id));
    }
    if let Some(name) = new_name {
        production.output_product_name = name;
    }
    if let Some(quantity) = input.target_quantity {
        production.output_quantity = quantity;
    }
    if let Some(plan) = new_plan {
        production.planned_ingredients = plan;
    }
    Ok(())
}

/// Completes a run: consumes actual ingredients FIFO, rolls material cost
/// into the accumulated operational cost, and creates the single
/// finished-good output batch.
///
/// Completion is a one-way transition; completing an already completed run
/// fails with `ProductionAlreadyCompleted` and changes nothing. A
/// shortfall on any ingredient fails the whole completion.
pub fn complete_production(
    state: &mut LedgerState,
    id: ProductionId,
    input: &CompleteProductionInput,
) -> Result<BatchId, EngineError> {
    let production = state
        .production(id)
        .ok_or(EngineError::ProductionNotFound(id))?;
    if !production.is_in_progress() {
        return Err(EngineError::ProductionAlreadyCompleted(id));
    }
    if input.actual_quantity < Decimal::ZERO {
        return Err(EngineError::NonPositiveQuantity);
    }
    let actual_ingredients = normalize_ingredients(&input.actual_ingredients)?;
    let operational_cost = production.total_cost;
    let output_product_name = production.output_product_name.clone();

    // Consume each ingredient, committing between ingredients so repeated
    // product names see the already-drained layers. Atomicity across
    // ingredients comes from apply's scratch clone.
    let mut material_cost = Decimal::ZERO;
    let mut usages = Vec::new();
    for ingredient in actual_ingredients
        .iter()
        .filter(|i| i.quantity > Decimal::ZERO)
    {
        let plan = fifo::plan_consumption(
            &state.batches,
            &ingredient.product_name,
            StockType::RawMaterial,
            None,
            ingredient.quantity,
        )?;
        fifo::commit_consumption(&mut state.batches, &plan);
        material_cost += plan.total_cost;
        usages.extend(plan.lines.into_iter().map(|line| ProductionUsage {
            id: UsageId::new(),
            production_id: id,
            batch_id: line.batch_id,
            variant_label: line.variant_label,
            quantity: line.quantity,
            unit_cost: line.unit_cost,
        }));
    }

    let final_cost = operational_cost + material_cost;
    let unit_cost = if input.actual_quantity > Decimal::ZERO {
        (final_cost / input.actual_quantity)
            .round_dp_with_strategy(4, RoundingStrategy::MidpointNearestEven)
    } else {
        Decimal::ZERO
    };

    let variants = if input.output_variants.is_empty() {
        vec![BatchVariant {
            label: DEFAULT_VARIANT.to_string(),
            quantity: input.actual_quantity,
        }]
    } else {
        let mut built = Vec::with_capacity(input.output_variants.len());
        for variant in &input.output_variants {
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
        built
    };

    let output = Batch {
        id: BatchId::new(),
        product_name: output_product_name,
        stock_type: StockType::FinishedGood,
        variants,
        initial_quantity: input.actual_quantity,
        unit_cost,
        created_at: input.completed_at,
        seq: state.allocate_seq(),
    };
    let batch_id = output.id;
    state.batches.push(output);
    state.production_usages.extend(usages);

    let production = state
        .production_mut(id)
        .ok_or(EngineError::ProductionNotFound(id))?;
    production.status = ProductionStatus::Completed;
    production.completed_at = Some(input.completed_at);
    production.batch_id_created = Some(batch_id);
    production.output_quantity = input.actual_quantity;
    production.total_cost = final_cost;
    production.actual_ingredients = actual_ingredients;
    Ok(batch_id)
}

/// Deletes a run, exactly restoring its recorded raw-material consumption
/// and removing its output batch, usages, and linked transactions.
///
/// Refused once any of the output batch has been sold.
pub fn delete_production(state: &mut LedgerState, id: ProductionId) -> Result<(), EngineError> {
    let production = state
        .production(id)
        .ok_or(EngineError::ProductionNotFound(id))?;
    let output_batch_id = production.batch_id_created;

    if production.status == ProductionStatus::Completed {
        if let Some(batch) = output_batch_id.and_then(|bid| state.batch(bid)) {
            if batch.consumed_quantity() > Decimal::ZERO {
                return Err(EngineError::ProductionOutputSold(id));
            }
        }
    }

    let usages: Vec<ProductionUsage> = state
        .production_usages
        .iter()
        .filter(|u| u.production_id == id)
        .cloned()
        .collect();
    for usage in &usages {
        fifo::restore_line(
            &mut state.batches,
            usage.batch_id,
            &usage.variant_label,
            usage.quantity,
        );
    }

    if let Some(batch_id) = output_batch_id {
        state.batches.retain(|b| b.id != batch_id);
    }
    state.productions.retain(|p| p.id != id);
    state.production_usages.retain(|u| u.production_id != id);
    state
        .transactions
        .retain(|t| t.related_id != Some(id.into_inner()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cashbook::PaymentMethod;
    use crate::inventory::service::{create_batch, CreateBatchInput};
    use rust_decimal_macros::dec;

    fn seed_raw_material(state: &mut LedgerState, name: &str, qty: Decimal, cost: Decimal) {
        create_batch(
            state,
            &CreateBatchInput {
                product_name: name.into(),
                stock_type: StockType::RawMaterial,
                quantity: qty,
                variants: vec![],
                unit_cost: cost,
                created_at: Utc::now(),
                payment_method: PaymentMethod::Cash,
            },
        )
        .unwrap();
    }

    fn start_input() -> StartProductionInput {
        StartProductionInput {
            output_product_name: "soap".into(),
            target_quantity: dec!(20),
            planned_ingredients: vec![Ingredient {
                product_name: "oil".into(),
                quantity: dec!(0),
            }],
            operational_costs: vec![
                OperationalCost {
                    description: "labor".into(),
                    amount: dec!(50),
                    payment_method: PaymentMethod::Cash,
                },
                OperationalCost {
                    description: "gas".into(),
                    amount: dec!(0),
                    payment_method: PaymentMethod::Cash,
                },
            ],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_start_production_records_costs_without_consuming() {
        let mut state = LedgerState::default();
        seed_raw_material(&mut state, "oil", dec!(100), dec!(1));
        let tx_count_before = state.transactions.len();

        let id = start_production(&mut state, &start_input()).unwrap();

        let production = state.production(id).unwrap();
        assert_eq!(production.status, ProductionStatus::InProgress);
        assert_eq!(production.total_cost, dec!(50));
        assert_eq!(production.output_product_name, "SOAP");
        // Raw material untouched.
        assert_eq!(state.total_on_hand("OIL", StockType::RawMaterial), dec!(100));
        // One transaction for the positive cost only.
        assert_eq!(state.transactions.len(), tx_count_before + 1);
        assert_eq!(
            state.transactions.last().unwrap().category,
            TransactionCategory::ProductionCost
        );
    }

    #[test]
    fn test_complete_production_consumes_fifo_and_prices_output() {
        let mut state = LedgerState::default();
        seed_raw_material(&mut state, "oil", dec!(30), dec!(2));
        seed_raw_material(&mut state, "oil", dec!(30), dec!(4));
        let id = start_production(&mut state, &start_input()).unwrap();

        let batch_id = complete_production(
            &mut state,
            id,
            &CompleteProductionInput {
                actual_quantity: dec!(25),
                actual_ingredients: vec![Ingredient {
                    product_name: "oil".into(),
                    quantity: dec!(40),
                }],
                output_variants: vec![],
                completed_at: Utc::now(),
            },
        )
        .unwrap();

        // 30 @ 2 + 10 @ 4 = 100 material, + 50 operational = 150 total.
        let production = state.production(id).unwrap();
        assert_eq!(production.status, ProductionStatus::Completed);
        assert_eq!(production.total_cost, dec!(150));
        assert_eq!(production.batch_id_created, Some(batch_id));
        assert_eq!(production.output_quantity, dec!(25));

        let output = state.batch(batch_id).unwrap();
        assert_eq!(output.stock_type, StockType::FinishedGood);
        assert_eq!(output.current_quantity(), dec!(25));
        assert_eq!(output.unit_cost, dec!(6)); // 150 / 25

        assert_eq!(state.total_on_hand("OIL", StockType::RawMaterial), dec!(20));
        assert_eq!(state.production_usages.len(), 2);
    }

    #[test]
    fn test_complete_production_is_one_way() {
        let mut state = LedgerState::default();
        seed_raw_material(&mut state, "oil", dec!(100), dec!(1));
        let id = start_production(&mut state, &start_input()).unwrap();

        let complete = CompleteProductionInput {
            actual_quantity: dec!(10),
            actual_ingredients: vec![Ingredient {
                product_name: "oil".into(),
                quantity: dec!(5),
            }],
            output_variants: vec![],
            completed_at: Utc::now(),
        };
        complete_production(&mut state, id, &complete).unwrap();
        let snapshot = state.clone();

        assert!(matches!(
            complete_production(&mut state, id, &complete),
            Err(EngineError::ProductionAlreadyCompleted(_))
        ));
        // No duplicate output batch, no duplicate consumption.
        assert_eq!(state, snapshot);
    }

    #[test]
    fn test_zero_output_quantity_guards_division() {
        let mut state = LedgerState::default();
        seed_raw_material(&mut state, "oil", dec!(100), dec!(1));
        let id = start_production(&mut state, &start_input()).unwrap();

        let batch_id = complete_production(
            &mut state,
            id,
            &CompleteProductionInput {
                actual_quantity: dec!(0),
                actual_ingredients: vec![],
                output_variants: vec![],
                completed_at: Utc::now(),
            },
        )
        .unwrap();

        assert_eq!(state.batch(batch_id).unwrap().unit_cost, dec!(0));
    }

    #[test]
    fn test_delete_production_restores_exact_consumption() {
        let mut state = LedgerState::default();
        seed_raw_material(&mut state, "oil", dec!(30), dec!(2));
        seed_raw_material(&mut state, "oil", dec!(30), dec!(4));
        let id = start_production(&mut state, &start_input()).unwrap();
        complete_production(
            &mut state,
            id,
            &CompleteProductionInput {
                actual_quantity: dec!(25),
                actual_ingredients: vec![Ingredient {
                    product_name: "oil".into(),
                    quantity: dec!(40),
                }],
                output_variants: vec![],
                completed_at: Utc::now(),
            },
        )
        .unwrap();

        delete_production(&mut state, id).unwrap();

        assert_eq!(state.total_on_hand("OIL", StockType::RawMaterial), dec!(60));
        assert_eq!(state.total_on_hand("SOAP", StockType::FinishedGood), dec!(0));
        assert!(state.production(id).is_none());
        assert!(state.production_usages.is_empty());
        assert!(
            !state
                .transactions
                .iter()
                .any(|t| t.related_id == Some(id.into_inner()))
        );
    }

    #[test]
    fn test_delete_production_refused_when_output_sold() {
        let mut state = LedgerState::default();
        seed_raw_material(&mut state, "oil", dec!(100), dec!(1));
        let id = start_production(&mut state, &start_input()).unwrap();
        let batch_id = complete_production(
            &mut state,
            id,
            &CompleteProductionInput {
                actual_quantity: dec!(10),
                actual_ingredients: vec![],
                output_variants: vec![],
                completed_at: Utc::now(),
            },
        )
        .unwrap();

        // Simulate a partial sale of the output.
        state.batch_mut(batch_id).unwrap().variants[0].quantity = dec!(7);

        assert!(matches!(
            delete_production(&mut state, id),
            Err(EngineError::ProductionOutputSold(_))
        ));
        assert!(state.production(id).is_some());
    }

    #[test]
    fn test_update_production_only_while_in_progress() {
        let mut state = LedgerState::default();
        let id = start_production(&mut state, &start_input()).unwrap();

        update_production(
            &mut state,
            id,
            &UpdateProductionInput {
                target_quantity: Some(dec!(35)),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(state.production(id).unwrap().output_quantity, dec!(35));

        complete_production(
            &mut state,
            id,
            &CompleteProductionInput {
                actual_quantity: dec!(10),
                actual_ingredients: vec![],
                output_variants: vec![],
                completed_at: Utc::now(),
            },
        )
        .unwrap();

        assert!(matches!(
            update_production(
                &mut state,
                id,
                &UpdateProductionInput {
                    target_quantity: Some(dec!(1)),
                    ..Default::default()
                }
            ),
            Err(EngineError::ProductionNotEditable(_))
        ));
    }
}
