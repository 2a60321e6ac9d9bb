//! # covenant-rpc
//!
//! The node-facing surface of the invocation engine: the [`EthRpc`] trait,
//! a JSON-RPC [`RpcClient`] implementing it over a pluggable [`Transport`],
//! and the request and receipt types those methods exchange.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod client;
mod error;
mod transport;
mod types;

pub use client::RpcClient;
pub use error::RpcError;
pub use transport::{deserialize_response, MockTransport, Transport};
pub use types::{BlockId, CallRequest};

#[cfg(feature = "http")]
pub use transport::HttpTransport;

use async_trait::async_trait;
use bytes::Bytes;
use covenant_primitives::{Address, H256};
use covenant_types::Receipt;

/// Node methods the invocation engine depends on
#[async_trait]
pub trait EthRpc: Send + Sync {
    /// Execute a read-only call and return the raw output
    async fn call(&self, request: &CallRequest, block: BlockId) -> Result<Bytes, RpcError>;

    /// Number of transactions sent from `address`, i.e. its next nonce
    async fn get_transaction_count(&self, address: &Address, block: BlockId)
        -> Result<u64, RpcError>;

    /// Broadcast a signed raw transaction and return its hash
    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<H256, RpcError>;

    /// Receipt of a mined transaction, `None` while pending or unknown
    async fn get_transaction_receipt(&self, hash: &H256) -> Result<Option<Receipt>, RpcError>;

    /// Chain id used for EIP-155 signing
    async fn chain_id(&self) -> Result<u64, RpcError>;
}
