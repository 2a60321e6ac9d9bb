//! ABI error types

use thiserror::Error;

/// Error raised by the type system, encoder, decoder or descriptor loaders
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AbiError {
    /// Type outside the ranges Solidity allows
    #[error("invalid type: {0}")]
    InvalidType(String),

    /// Values do not match the declared parameters
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Malformed, truncated or out-of-range input bytes
    #[error("decoding error: {0}")]
    Decoding(String),

    /// Unparseable type string, signature or literal
    #[error("parse error: {0}")]
    Parse(String),

    /// No function or event with that name
    #[error("unknown {kind}: {name}")]
    UnknownItem {
        /// `function` or `event`
        kind: &'static str,
        /// Requested name
        name: String,
    },

    /// Malformed ABI JSON document
    #[error("invalid ABI JSON: {0}")]
    Json(String),
}

impl AbiError {
    /// True for errors raised while decoding bytes
    pub fn is_decoding(&self) -> bool {
        matches!(self, AbiError::Decoding(_))
    }
}

impl From<serde_json::Error> for AbiError {
    fn from(e: serde_json::Error) -> Self {
        AbiError::Json(e.to_string())
    }
}
