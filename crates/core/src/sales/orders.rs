//! Deposit order operations: add, edit, complete, cancel, delete.
//!
//! A pending order only holds a deposit; no stock is reserved. Completion
//! consumes stock exactly like a direct sale and produces a linked sale
//! record; cancellation forfeits the deposit without touching inventory.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use warung_shared::types::{OrderId, SaleId, UsageId};

use super::types::{DepositOrder, OrderStatus, SaleConsumption, SaleRecord};
use crate::cashbook::{PaymentMethod, Transaction, TransactionCategory};
use crate::error::EngineError;
use crate::inventory::{fifo, normalize_name, StockType};
use crate::ledger::LedgerState;

/// Input for placing a deposit order.
#[derive(Debug, Clone)]
pub struct AddOrderInput {
    /// Customer placing the order.
    pub customer_name: String,
    /// Product ordered.
    pub product_name: String,
    /// Units ordered.
    pub quantity: Decimal,
    /// Full order amount.
    pub total_amount: Decimal,
    /// Amount paid upfront.
    pub deposit_amount: Decimal,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
    /// Sub-ledger the deposit went into.
    pub payment_method: PaymentMethod,
}

/// Partial update for a pending deposit order.
#[derive(Debug, Clone, Default)]
pub struct EditOrderInput {
    /// New customer name.
    pub customer_name: Option<String>,
    /// New product name.
    pub product_name: Option<String>,
    /// New quantity.
    pub quantity: Option<Decimal>,
    /// New total amount.
    pub total_amount: Option<Decimal>,
    /// New deposit amount.
    pub deposit_amount: Option<Decimal>,
    /// New order time.
    pub created_at: Option<DateTime<Utc>>,
}

fn deposit_description(customer_name: &str, product_name: &str) -> String {
    format!("Order deposit: {customer_name} ({product_name})")
}

/// Places a pending order and records the deposit received.
pub fn add_order(state: &mut LedgerState, input: &AddOrderInput) -> Result<OrderId, EngineError> {
    let customer_name = input.customer_name.trim().to_string();
    if customer_name.is_empty() {
        return Err(EngineError::EmptyCustomerName);
    }
    let product_name = normalize_name(&input.product_name);
    if product_name.is_empty() {
        return Err(EngineError::EmptyProductName);
    }
    if input.quantity <= Decimal::ZERO {
        return Err(EngineError::NonPositiveQuantity);
    }
    if input.total_amount <= Decimal::ZERO {
        return Err(EngineError::NonPositiveAmount);
    }
    if input.deposit_amount < Decimal::ZERO {
        return Err(EngineError::NonPositiveAmount);
    }
    if input.deposit_amount > input.total_amount {
        return Err(EngineError::DepositExceedsTotal {
            deposit: input.deposit_amount,
            total: input.total_amount,
        });
    }

    let order = DepositOrder {
        id: OrderId::new(),
        customer_name: customer_name.clone(),
        product_name: product_name.clone(),
        quantity: input.quantity,
        total_amount: input.total_amount,
        deposit_amount: input.deposit_amount,
        status: OrderStatus::Pending,
        created_at: input.created_at,
        completed_at: None,
    };
    let id = order.id;

    state.transactions.push(Transaction::cash_in(
        TransactionCategory::Deposit,
        input.deposit_amount,
        deposit_description(&customer_name, &product_name),
        input.created_at,
        Some(id.into_inner()),
        input.payment_method,
    ));
    state.orders.push(order);
    Ok(id)
}

/// Edits a pending order and keeps its deposit transaction consistent.
pub fn edit_order(
    state: &mut LedgerState,
    id: OrderId,
    input: &EditOrderInput,
) -> Result<(), EngineError> {
    let new_customer = match &input.customer_name {
        Some(name) => {
            let trimmed = name.trim().to_string();
            if trimmed.is_empty() {
                return Err(EngineError::EmptyCustomerName);
            }
            Some(trimmed)
        }
        None => None,
    };
    let new_product = match &input.product_name {
        Some(name) => {
            let normalized = normalize_name(name);
            if normalized.is_empty() {
                return Err(EngineError::EmptyProductName);
            }
            Some(normalized)
        }
        None => None,
    };
    if input.quantity.is_some_and(|q| q <= Decimal::ZERO) {
        return Err(EngineError::NonPositiveQuantity);
    }

    let order = state.order(id).ok_or(EngineError::OrderNotFound(id))?;
    if order.status != OrderStatus::Pending {
        return Err(EngineError::OrderNotPending(id));
    }
    let total_amount = input.total_amount.unwrap_or(order.total_amount);
    let deposit_amount = input.deposit_amount.unwrap_or(order.deposit_amount);
    if total_amount <= Decimal::ZERO {
        return Err(EngineError::NonPositiveAmount);
    }
    if deposit_amount < Decimal::ZERO {
        return Err(EngineError::NonPositiveAmount);
    }
    if deposit_amount > total_amount {
        return Err(EngineError::DepositExceedsTotal {
            deposit: deposit_amount,
            total: total_amount,
        });
    }

    let order = state.order_mut(id).ok_or(EngineError::OrderNotFound(id))?;
    if let Some(customer_name) = new_customer {
        order.customer_name = customer_name;
    }
    if let Some(product_name) = new_product {
        order.product_name = product_name;
    }
    if let Some(quantity) = input.quantity {
        order.quantity = quantity;
    }
    order.total_amount = total_amount;
    order.deposit_amount = deposit_amount;
    if let Some(created_at) = input.created_at {
        order.created_at = created_at;
    }
    let (customer_name, product_name, created_at) = (
        order.customer_name.clone(),
        order.product_name.clone(),
        order.created_at,
    );

    if let Some(tx) = state.transactions.iter_mut().find(|t| {
        t.related_id == Some(id.into_inner()) && t.category == TransactionCategory::Deposit
    }) {
        tx.amount = deposit_amount;
        tx.description = deposit_description(&customer_name, &product_name);
        tx.created_at = created_at;
    }
    Ok(())
}

/// Completes a pending order: consumes stock for the full quantity, settles
/// the deposit, records the balance received, and creates the linked sale.
///
/// On insufficient stock the order stays pending and nothing changes.
pub fn complete_order(
    state: &mut LedgerState,
    id: OrderId,
    completed_at: DateTime<Utc>,
    payment_method: PaymentMethod,
) -> Result<SaleId, EngineError> {
    let order = state.order(id).cloned().ok_or(EngineError::OrderNotFound(id))?;
    if order.status != OrderStatus::Pending {
        return Err(EngineError::OrderNotPending(id));
    }

    let plan = fifo::plan_consumption(
        &state.batches,
        &order.product_name,
        StockType::FinishedGood,
        None,
        order.quantity,
    )?;
    fifo::commit_consumption(&mut state.batches, &plan);

    let sale_price = (order.total_amount / order.quantity)
        .round_dp_with_strategy(4, RoundingStrategy::MidpointNearestEven);
    let sale = SaleRecord {
        id: SaleId::new(),
        product_name: order.product_name.clone(),
        variant_label: None,
        quantity: order.quantity,
        sale_price,
        total_revenue: order.total_amount,
        total_cogs: plan.total_cost,
        created_at: completed_at,
        related_order_id: Some(id),
    };
    let sale_id = sale.id;

    state
        .sale_consumptions
        .extend(plan.lines.into_iter().map(|line| SaleConsumption {
            id: UsageId::new(),
            sale_id,
            batch_id: line.batch_id,
            variant_label: line.variant_label,
            quantity: line.quantity,
            unit_cost: line.unit_cost,
        }));

    for tx in state.transactions.iter_mut().filter(|t| {
        t.related_id == Some(id.into_inner()) && t.category == TransactionCategory::Deposit
    }) {
        tx.category = TransactionCategory::DepositSettled;
        tx.description = format!(
            "Deposit settled: {} ({})",
            order.customer_name, order.product_name
        );
    }
    state.transactions.push(Transaction::cash_in(
        TransactionCategory::Sales,
        order.remaining_balance(),
        format!(
            "Order balance: {} ({})",
            order.customer_name, order.product_name
        ),
        completed_at,
        Some(id.into_inner()),
        payment_method,
    ));
    state.sales.push(sale);

    let order = state.order_mut(id).ok_or(EngineError::OrderNotFound(id))?;
    order.status = OrderStatus::Completed;
    order.completed_at = Some(completed_at);
    Ok(sale_id)
}

/// Cancels a pending order, forfeiting the deposit. Inventory untouched.
pub fn cancel_order(
    state: &mut LedgerState,
    id: OrderId,
    cancelled_at: DateTime<Utc>,
) -> Result<(), EngineError> {
    let order = state.order(id).ok_or(EngineError::OrderNotFound(id))?;
    if order.status != OrderStatus::Pending {
        return Err(EngineError::OrderNotPending(id));
    }
    let (customer_name, product_name) =
        (order.customer_name.clone(), order.product_name.clone());

    for tx in state.transactions.iter_mut().filter(|t| {
        t.related_id == Some(id.into_inner()) && t.category == TransactionCategory::Deposit
    }) {
        tx.category = TransactionCategory::ForfeitedDeposit;
        tx.description = format!("Forfeited deposit: {customer_name} ({product_name})");
    }

    let order = state.order_mut(id).ok_or(EngineError::OrderNotFound(id))?;
    order.status = OrderStatus::Cancelled;
    order.completed_at = Some(cancelled_at);
    Ok(())
}

/// Deletes a pending or cancelled order and its transactions.
///
/// Completed orders are removed by deleting their linked sale, which also
/// restores stock and reverts the settlement.
pub fn delete_order(state: &mut LedgerState, id: OrderId) -> Result<(), EngineError> {
    let order = state.order(id).ok_or(EngineError::OrderNotFound(id))?;
    if order.status == OrderStatus::Completed {
        return Err(EngineError::OrderCompleted(id));
    }
    state.orders.retain(|o| o.id != id);
    state
        .transactions
        .retain(|t| t.related_id != Some(id.into_inner()));
    Ok(())
}
