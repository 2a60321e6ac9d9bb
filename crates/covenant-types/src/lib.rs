//! # covenant-types
//!
//! Chain-facing records exchanged with a node: the unsigned
//! [`TransactionRequest`] built per invocation, and the [`Receipt`] /
//! [`Log`] a node reports once a transaction is mined.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod receipt;
mod transaction;

pub use receipt::{Log, Receipt, TxStatus};
pub use transaction::TransactionRequest;
