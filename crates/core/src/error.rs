//! Engine error taxonomy.
//!
//! Three families of failures can come out of a command: validation errors
//! (malformed input caught before any mutation), insufficient stock (the
//! FIFO selector cannot cover the requested quantity), and conflicts
//! (a structural edit or deletion would violate a referential invariant).
//! Lookups that miss report the entity id that was requested.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;
use warung_shared::types::{BatchId, LoanId, OrderId, ProductionId, SaleId, TransactionId};

/// Coarse classification of an engine error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input, rejected before any mutation.
    Validation,
    /// Requested consumption exceeds total availability.
    InsufficientStock,
    /// A referential invariant forbids the operation.
    Conflict,
    /// The referenced entity does not exist.
    NotFound,
}

/// Errors that can occur while applying an engine command.
#[derive(Debug, Error)]
pub enum EngineError {
    // ========== Validation Errors ==========
    /// Quantity must be strictly positive.
    #[error("Quantity must be positive")]
    NonPositiveQuantity,

    /// Monetary amount must be strictly positive.
    #[error("Amount must be positive")]
    NonPositiveAmount,

    /// Unit cost cannot be negative.
    #[error("Unit cost cannot be negative")]
    NegativeUnitCost,

    /// Price cannot be negative.
    #[error("Price cannot be negative")]
    NegativePrice,

    /// Product name is required.
    #[error("Product name cannot be empty")]
    EmptyProductName,

    /// Customer name is required.
    #[error("Customer name cannot be empty")]
    EmptyCustomerName,

    /// Loan source is required.
    #[error("Loan source cannot be empty")]
    EmptyLoanSource,

    /// Variant labels must be non-empty.
    #[error("Variant label cannot be empty")]
    EmptyVariantLabel,

    /// Variant labels must be unique within a batch.
    #[error("Duplicate variant label: {0}")]
    DuplicateVariantLabel(String),

    /// Variant quantities cannot be negative.
    #[error("Variant quantity cannot be negative")]
    NegativeVariantQuantity,

    /// The deposit cannot exceed the order total.
    #[error("Deposit ({deposit}) cannot exceed the order total ({total})")]
    DepositExceedsTotal {
        /// Deposit paid upfront.
        deposit: Decimal,
        /// Full order amount.
        total: Decimal,
    },

    /// A repayment must carry a principal or interest portion.
    #[error("Repayment must have a positive principal or interest portion")]
    EmptyRepayment,

    /// Transfers must move funds between two different methods.
    #[error("Transfer source and destination must differ")]
    SameTransferAccount,

    // ========== Insufficient Stock ==========
    /// Requested consumption exceeds total available quantity.
    #[error(
        "Insufficient stock for {product_name}: available {available}, requested {requested}"
    )]
    InsufficientStock {
        /// Product whose stock fell short.
        product_name: String,
        /// Variant requested, if any.
        variant_label: Option<String>,
        /// Total quantity available across matching batches.
        available: Decimal,
        /// Quantity that was requested.
        requested: Decimal,
    },

    // ========== Conflict Errors ==========
    /// The batch has recorded consumption and cannot be deleted.
    #[error("Batch {0} has recorded consumption and cannot be deleted")]
    BatchConsumed(BatchId),

    /// The production run is already completed.
    #[error("Production {0} is already completed")]
    ProductionAlreadyCompleted(ProductionId),

    /// Only in-progress production runs can be edited.
    #[error("Production {0} is completed and can no longer be edited")]
    ProductionNotEditable(ProductionId),

    /// The production output batch has been partially sold.
    #[error("Output of production {0} has been partially sold")]
    ProductionOutputSold(ProductionId),

    /// The order is not in the pending state.
    #[error("Order {0} is not pending")]
    OrderNotPending(OrderId),

    /// Completed orders are removed through their linked sale.
    #[error("Order {0} is completed; delete its linked sale instead")]
    OrderCompleted(OrderId),

    /// The loan already has repayments recorded.
    #[error("Loan {0} has repayments recorded and cannot be deleted")]
    LoanRepaid(LoanId),

    /// System-owned transactions are mutated through their owning entity.
    #[error("Transaction {0} is system-owned; mutate its owning entity instead")]
    TransactionSystemOwned(TransactionId),

    // ========== Not Found ==========
    /// Batch not found.
    #[error("Batch not found: {0}")]
    BatchNotFound(BatchId),

    /// Production run not found.
    #[error("Production not found: {0}")]
    ProductionNotFound(ProductionId),

    /// Sale not found.
    #[error("Sale not found: {0}")]
    SaleNotFound(SaleId),

    /// Deposit order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// Loan not found.
    #[error("Loan not found: {0}")]
    LoanNotFound(LoanId),

    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    /// Transfer group not found.
    #[error("Transfer not found: {0}")]
    TransferNotFound(Uuid),
}

impl EngineError {
    /// Returns the coarse classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NonPositiveQuantity
            | Self::NonPositiveAmount
            | Self::NegativeUnitCost
            | Self::NegativePrice
            | Self::EmptyProductName
            | Self::EmptyCustomerName
            | Self::EmptyLoanSource
            | Self::EmptyVariantLabel
            | Self::DuplicateVariantLabel(_)
            | Self::NegativeVariantQuantity
            | Self::DepositExceedsTotal { .. }
            | Self::EmptyRepayment
            | Self::SameTransferAccount => ErrorKind::Validation,

            Self::InsufficientStock { .. } => ErrorKind::InsufficientStock,

            Self::BatchConsumed(_)
            | Self::ProductionAlreadyCompleted(_)
            | Self::ProductionNotEditable(_)
            | Self::ProductionOutputSold(_)
            | Self::OrderNotPending(_)
            | Self::OrderCompleted(_)
            | Self::LoanRepaid(_)
            | Self::TransactionSystemOwned(_) => ErrorKind::Conflict,

            Self::BatchNotFound(_)
            | Self::ProductionNotFound(_)
            | Self::SaleNotFound(_)
            | Self::OrderNotFound(_)
            | Self::LoanNotFound(_)
            | Self::TransactionNotFound(_)
            | Self::TransferNotFound(_) => ErrorKind::NotFound,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveQuantity => "NON_POSITIVE_QUANTITY",
            Self::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            Self::NegativeUnitCost => "NEGATIVE_UNIT_COST",
            Self::NegativePrice => "NEGATIVE_PRICE",
            Self::EmptyProductName => "EMPTY_PRODUCT_NAME",
            Self::EmptyCustomerName => "EMPTY_CUSTOMER_NAME",
            Self::EmptyLoanSource => "EMPTY_LOAN_SOURCE",
            Self::EmptyVariantLabel => "EMPTY_VARIANT_LABEL",
            Self::DuplicateVariantLabel(_) => "DUPLICATE_VARIANT_LABEL",
            Self::NegativeVariantQuantity => "NEGATIVE_VARIANT_QUANTITY",
            Self::DepositExceedsTotal { .. } => "DEPOSIT_EXCEEDS_TOTAL",
            Self::EmptyRepayment => "EMPTY_REPAYMENT",
            Self::SameTransferAccount => "SAME_TRANSFER_ACCOUNT",
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::BatchConsumed(_) => "BATCH_CONSUMED",
            Self::ProductionAlreadyCompleted(_) => "PRODUCTION_ALREADY_COMPLETED",
            Self::ProductionNotEditable(_) => "PRODUCTION_NOT_EDITABLE",
            Self::ProductionOutputSold(_) => "PRODUCTION_OUTPUT_SOLD",
            Self::OrderNotPending(_) => "ORDER_NOT_PENDING",
            Self::OrderCompleted(_) => "ORDER_COMPLETED",
            Self::LoanRepaid(_) => "LOAN_REPAID",
            Self::TransactionSystemOwned(_) => "TRANSACTION_SYSTEM_OWNED",
            Self::BatchNotFound(_) => "BATCH_NOT_FOUND",
            Self::ProductionNotFound(_) => "PRODUCTION_NOT_FOUND",
            Self::SaleNotFound(_) => "SALE_NOT_FOUND",
            Self::OrderNotFound(_) => "ORDER_NOT_FOUND",
            Self::LoanNotFound(_) => "LOAN_NOT_FOUND",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::TransferNotFound(_) => "TRANSFER_NOT_FOUND",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::InsufficientStock => 422,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_kinds() {
        assert_eq!(EngineError::NonPositiveQuantity.kind(), ErrorKind::Validation);
        assert_eq!(
            EngineError::InsufficientStock {
                product_name: "FLOUR".into(),
                variant_label: None,
                available: dec!(3),
                requested: dec!(5),
            }
            .kind(),
            ErrorKind::InsufficientStock
        );
        assert_eq!(
            EngineError::BatchConsumed(BatchId::new()).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            EngineError::LoanNotFound(LoanId::new()).kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(EngineError::NonPositiveAmount.http_status_code(), 400);
        assert_eq!(
            EngineError::SaleNotFound(SaleId::new()).http_status_code(),
            404
        );
        assert_eq!(
            EngineError::OrderNotPending(OrderId::new()).http_status_code(),
            409
        );
        assert_eq!(
            EngineError::InsufficientStock {
                product_name: "SOAP".into(),
                variant_label: None,
                available: dec!(0),
                requested: dec!(1),
            }
            .http_status_code(),
            422
        );
    }

    #[test]
    fn test_error_display() {
        let err = EngineError::InsufficientStock {
            product_name: "SOAP".into(),
            variant_label: Some("LARGE".into()),
            available: dec!(4),
            requested: dec!(10),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for SOAP: available 4, requested 10"
        );

        let err = EngineError::DepositExceedsTotal {
            deposit: dec!(500),
            total: dec!(300),
        };
        assert_eq!(
            err.to_string(),
            "Deposit (500) cannot exceed the order total (300)"
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            EngineError::NonPositiveQuantity.error_code(),
            "NON_POSITIVE_QUANTITY"
        );
        assert_eq!(
            EngineError::TransactionSystemOwned(TransactionId::new()).error_code(),
            "TRANSACTION_SYSTEM_OWNED"
        );
    }
}
