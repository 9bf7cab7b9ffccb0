//! Aggregate snapshot state and command application.
//!
//! The whole application state is one serializable snapshot. Commands are
//! applied as atomic snapshot transitions: `LedgerState::apply` runs the
//! operation against a private clone and returns the next snapshot, so a
//! failing multi-step operation can never leave partial state behind.

pub mod command;
pub mod state;

#[cfg(test)]
mod command_props;

pub use command::{Applied, Command, Receipt};
pub use state::LedgerState;
