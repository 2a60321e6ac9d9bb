//! Errors for primitive parsing

use thiserror::Error;

/// Primitive parsing error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    /// Input was not valid hex
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    /// Input had the wrong byte length for the target type
    #[error("invalid {kind} length: expected {expected} bytes, got {got}")]
    InvalidLength {
        /// Name of the target type
        kind: &'static str,
        /// Required length in bytes
        expected: usize,
        /// Supplied length in bytes
        got: usize,
    },
}
