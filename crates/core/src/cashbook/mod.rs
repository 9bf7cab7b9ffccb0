//! The derived cash transaction log.
//!
//! Every inventory-affecting operation emits matching transaction entries
//! atomically with its inventory mutation. Entries carrying a `related_id`
//! are system-owned: they are only edited or deleted by mutating the entity
//! that generated them. Manual entries (no `related_id`) are free-form.

pub mod service;
pub mod types;

pub use service::{EditTransactionInput, ManualTransactionInput, TransferInput};
pub use types::{
    CashPosition, PaymentMethod, Transaction, TransactionCategory, TransactionKind,
};
