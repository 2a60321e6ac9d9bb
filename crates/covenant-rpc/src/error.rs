//! RPC error types

use serde_json::Value;
use thiserror::Error;

/// Error raised while talking to a node
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RpcError {
    /// Connection, HTTP or envelope failure
    #[error("transport error: {0}")]
    Transport(String),

    /// JSON-RPC error object returned by the node
    #[error("node error {code}: {message}")]
    Node {
        /// JSON-RPC error code
        code: i64,
        /// Error message
        message: String,
        /// Optional extra payload, such as revert data
        data: Option<Value>,
    },

    /// Request or response (de)serialization failed
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Response was well-formed JSON but not a valid value
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl RpcError {
    /// Create a node error without data
    pub fn node(code: i64, message: impl Into<String>) -> Self {
        RpcError::Node {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// True when the node received the request and rejected it
    pub fn is_node_error(&self) -> bool {
        matches!(self, RpcError::Node { .. })
    }
}

impl From<serde_json::Error> for RpcError {
    fn from(e: serde_json::Error) -> Self {
        RpcError::Serialization(e.to_string())
    }
}
