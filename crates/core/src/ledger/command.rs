//! Engine commands and atomic application.
//!
//! Every operation the engine supports is one `Command` variant. Applying
//! a command never mutates the snapshot it is called on: the operation
//! runs against a private clone, and the caller swaps in the returned
//! snapshot only on success. A multi-step operation that fails halfway
//! (say, the second ingredient of a production completion) therefore
//! leaves nothing behind.

use chrono::{DateTime, Utc};
use uuid::Uuid;
use warung_shared::types::{BatchId, LoanId, OrderId, ProductionId, SaleId, TransactionId};

use super::state::LedgerState;
use crate::cashbook::{
    service as cashbook, EditTransactionInput, ManualTransactionInput, PaymentMethod,
    TransferInput,
};
use crate::error::EngineError;
use crate::inventory::service::{self as inventory, CreateBatchInput, EditBatchInput};
use crate::loan::service::{self as loan, AddLoanInput, EditLoanInput, RepayLoanInput};
use crate::production::service::{
    self as production, CompleteProductionInput, StartProductionInput, UpdateProductionInput,
};
use crate::sales::orders::{self, AddOrderInput, EditOrderInput};
use crate::sales::service::{self as sales, EditSaleInput, RecordSaleInput};

/// One engine operation.
#[derive(Debug, Clone)]
pub enum Command {
    /// Create a stock batch (purchase).
    CreateBatch(CreateBatchInput),
    /// Edit a stock batch.
    EditBatch {
        /// Batch to edit.
        id: BatchId,
        /// Field updates.
        input: EditBatchInput,
    },
    /// Delete a stock batch.
    DeleteBatch(BatchId),

    /// Start a production run.
    StartProduction(StartProductionInput),
    /// Edit an in-progress production run.
    UpdateProduction {
        /// Run to edit.
        id: ProductionId,
        /// Field updates.
        input: UpdateProductionInput,
    },
    /// Complete a production run.
    CompleteProduction {
        /// Run to complete.
        id: ProductionId,
        /// Actual quantities and ingredients.
        input: CompleteProductionInput,
    },
    /// Delete a production run.
    DeleteProduction(ProductionId),

    /// Record a direct sale.
    RecordSale(RecordSaleInput),
    /// Edit a sale.
    EditSale {
        /// Sale to edit.
        id: SaleId,
        /// Field updates.
        input: EditSaleInput,
    },
    /// Delete a sale.
    DeleteSale(SaleId),

    /// Place a deposit order.
    AddOrder(AddOrderInput),
    /// Edit a pending deposit order.
    EditOrder {
        /// Order to edit.
        id: OrderId,
        /// Field updates.
        input: EditOrderInput,
    },
    /// Complete a pending deposit order.
    CompleteOrder {
        /// Order to complete.
        id: OrderId,
        /// Completion time.
        completed_at: DateTime<Utc>,
        /// Sub-ledger the balance settlement went into.
        payment_method: PaymentMethod,
    },
    /// Cancel a pending deposit order.
    CancelOrder {
        /// Order to cancel.
        id: OrderId,
        /// Cancellation time.
        cancelled_at: DateTime<Utc>,
    },
    /// Delete a pending or cancelled deposit order.
    DeleteOrder(OrderId),

    /// Record a loan.
    AddLoan(AddLoanInput),
    /// Edit a loan.
    EditLoan {
        /// Loan to edit.
        id: LoanId,
        /// Field updates.
        input: EditLoanInput,
    },
    /// Apply a loan repayment.
    RepayLoan {
        /// Loan being repaid.
        id: LoanId,
        /// Principal and interest portions.
        input: RepayLoanInput,
    },
    /// Delete a loan.
    DeleteLoan(LoanId),

    /// Add a manual cash entry.
    AddTransaction(ManualTransactionInput),
    /// Edit a manual cash entry.
    EditTransaction {
        /// Entry to edit.
        id: TransactionId,
        /// Field updates.
        input: EditTransactionInput,
    },
    /// Delete a manual cash entry.
    DeleteTransaction(TransactionId),
    /// Move funds between the cash and bank sub-ledgers.
    TransferFunds(TransferInput),
    /// Delete both legs of a transfer.
    DeleteTransfer(Uuid),
}

/// What a successfully applied command produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receipt {
    /// A batch was created.
    BatchCreated(BatchId),
    /// A production run was started.
    ProductionStarted(ProductionId),
    /// A production run was completed, creating its output batch.
    ProductionCompleted {
        /// The completed run.
        production_id: ProductionId,
        /// The finished-good batch it produced.
        batch_id: BatchId,
    },
    /// A sale was recorded.
    SaleRecorded(SaleId),
    /// An order was placed.
    OrderPlaced(OrderId),
    /// An order was completed, creating its linked sale.
    OrderCompleted {
        /// The completed order.
        order_id: OrderId,
        /// The sale that settled it.
        sale_id: SaleId,
    },
    /// A loan was recorded.
    LoanAdded(LoanId),
    /// A manual cash entry was added.
    TransactionAdded(TransactionId),
    /// A transfer was recorded.
    TransferRecorded(Uuid),
    /// An existing entity was updated.
    Updated,
    /// An existing entity was deleted.
    Deleted,
}

/// The result of applying a command: the next snapshot plus a receipt.
#[derive(Debug, Clone)]
pub struct Applied {
    /// The snapshot after the command.
    pub state: LedgerState,
    /// What the command produced.
    pub receipt: Receipt,
}

impl LedgerState {
    /// Applies a command as an atomic snapshot transition.
    ///
    /// # Errors
    ///
    /// Returns the operation's error with `self` untouched; no partial
    /// application of a multi-step operation is ever observable.
    pub fn apply(&self, command: Command) -> Result<Applied, EngineError> {
        let mut next = self.clone();
        let receipt = dispatch(&mut next, &command)?;
        Ok(Applied {
            state: next,
            receipt,
        })
    }
}

/// Routes a command to its service function.
fn dispatch(state: &mut LedgerState, command: &Command) -> Result<Receipt, EngineError> {
    match command {
        Command::CreateBatch(input) => {
            inventory::create_batch(state, input).map(Receipt::BatchCreated)
        }
        Command::EditBatch { id, input } => {
            inventory::edit_batch(state, *id, input).map(|()| Receipt::Updated)
        }
        Command::DeleteBatch(id) => {
            inventory::delete_batch(state, *id).map(|()| Receipt::Deleted)
        }

        Command::StartProduction(input) => {
            production::start_production(state, input).map(Receipt::ProductionStarted)
        }
        Command::UpdateProduction { id, input } => {
            production::update_production(state, *id, input).map(|()| Receipt::Updated)
        }
        Command::CompleteProduction { id, input } => production::complete_production(
            state, *id, input,
        )
        .map(|batch_id| Receipt::ProductionCompleted {
            production_id: *id,
            batch_id,
        }),
        Command::DeleteProduction(id) => {
            production::delete_production(state, *id).map(|()| Receipt::Deleted)
        }

        Command::RecordSale(input) => sales::record_sale(state, input).map(Receipt::SaleRecorded),
        Command::EditSale { id, input } => {
            sales::edit_sale(state, *id, input).map(|()| Receipt::Updated)
        }
        Command::DeleteSale(id) => sales::delete_sale(state, *id).map(|()| Receipt::Deleted),

        Command::AddOrder(input) => orders::add_order(state, input).map(Receipt::OrderPlaced),
        Command::EditOrder { id, input } => {
            orders::edit_order(state, *id, input).map(|()| Receipt::Updated)
        }
        Command::CompleteOrder {
            id,
            completed_at,
            payment_method,
        } => orders::complete_order(state, *id, *completed_at, *payment_method).map(|sale_id| {
            Receipt::OrderCompleted {
                order_id: *id,
                sale_id,
            }
        }),
        Command::CancelOrder { id, cancelled_at } => {
            orders::cancel_order(state, *id, *cancelled_at).map(|()| Receipt::Updated)
        }
        Command::DeleteOrder(id) => orders::delete_order(state, *id).map(|()| Receipt::Deleted),

        Command::AddLoan(input) => loan::add_loan(state, input).map(Receipt::LoanAdded),
        Command::EditLoan { id, input } => {
            loan::edit_loan(state, *id, input).map(|()| Receipt::Updated)
        }
        Command::RepayLoan { id, input } => {
            loan::repay_loan(state, *id, input).map(|()| Receipt::Updated)
        }
        Command::DeleteLoan(id) => loan::delete_loan(state, *id).map(|()| Receipt::Deleted),

        Command::AddTransaction(input) => {
            cashbook::add_manual_transaction(state, input).map(Receipt::TransactionAdded)
        }
        Command::EditTransaction { id, input } => {
            cashbook::edit_transaction(state, *id, input).map(|()| Receipt::Updated)
        }
        Command::DeleteTransaction(id) => {
            cashbook::delete_transaction(state, *id).map(|()| Receipt::Deleted)
        }
        Command::TransferFunds(input) => {
            cashbook::transfer_funds(state, input).map(Receipt::TransferRecorded)
        }
        Command::DeleteTransfer(group_id) => {
            cashbook::delete_transfer(state, *group_id).map(|()| Receipt::Deleted)
        }
    }
}
