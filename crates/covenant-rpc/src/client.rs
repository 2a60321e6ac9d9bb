//! RpcClient - JSON-RPC implementation of [`EthRpc`]

use async_trait::async_trait;
use bytes::Bytes;
use covenant_primitives::{encode_hex, Address, H256};
use covenant_types::Receipt;
use serde_json::Value;
use tracing::debug;

use crate::transport::{deserialize_response, MockTransport, Transport};
use crate::types::{parse_h256, parse_hex_bytes, parse_hex_u128, parse_hex_u64, RpcReceipt};
use crate::{BlockId, CallRequest, EthRpc, RpcError};

#[cfg(feature = "http")]
use crate::transport::HttpTransport;

/// JSON-RPC client for Ethereum-compatible nodes
pub struct RpcClient {
    transport: Box<dyn Transport>,
    chain_id: Option<u64>,
}

impl RpcClient {
    /// Create a client with HTTP transport. No request is made until first use.
    #[cfg(feature = "http")]
    pub fn http(url: &str) -> Self {
        Self::with_transport(HttpTransport::new(url))
    }

    /// Create a client with HTTP transport and cache the node's chain ID
    #[cfg(feature = "http")]
    pub async fn connect(url: &str) -> Result<Self, RpcError> {
        let mut client = Self::http(url);
        let chain_id = client.fetch_chain_id().await?;
        client.chain_id = Some(chain_id);
        Ok(client)
    }

    /// Create a new client with mock transport (for testing)
    pub fn new_mock() -> Self {
        Self {
            transport: Box::new(MockTransport::new()),
            chain_id: Some(1),
        }
    }

    /// Create a client with a custom transport
    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Box::new(transport),
            chain_id: None,
        }
    }

    /// Use a known chain ID instead of asking the node
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    /// Helper method to make RPC request and deserialize
    async fn request<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, RpcError> {
        debug!(method, "RPC request");
        let value = self.transport.request_json(method, params).await?;
        deserialize_response(value)
    }

    async fn fetch_chain_id(&self) -> Result<u64, RpcError> {
        let result: String = self.request("eth_chainId", vec![]).await?;
        parse_hex_u64(&result)
    }

    /// Get the current gas price
    pub async fn gas_price(&self) -> Result<u128, RpcError> {
        let result: String = self.request("eth_gasPrice", vec![]).await?;
        parse_hex_u128(&result)
    }

    /// Get the current block number
    pub async fn block_number(&self) -> Result<u64, RpcError> {
        let result: String = self.request("eth_blockNumber", vec![]).await?;
        parse_hex_u64(&result)
    }
}

#[async_trait]
impl EthRpc for RpcClient {
    async fn call(&self, request: &CallRequest, block: BlockId) -> Result<Bytes, RpcError> {
        let result: String = self
            .request(
                "eth_call",
                vec![serde_json::to_value(request)?, serde_json::to_value(block)?],
            )
            .await?;
        parse_hex_bytes(&result)
    }

    async fn get_transaction_count(
        &self,
        address: &Address,
        block: BlockId,
    ) -> Result<u64, RpcError> {
        let result: String = self
            .request(
                "eth_getTransactionCount",
                vec![Value::String(address.to_hex()), serde_json::to_value(block)?],
            )
            .await?;
        parse_hex_u64(&result)
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<H256, RpcError> {
        let result: String = self
            .request("eth_sendRawTransaction", vec![Value::String(encode_hex(raw))])
            .await?;
        parse_h256(&result)
    }

    async fn get_transaction_receipt(&self, hash: &H256) -> Result<Option<Receipt>, RpcError> {
        let result: Option<RpcReceipt> = self
            .request("eth_getTransactionReceipt", vec![Value::String(hash.to_hex())])
            .await?;
        result.map(RpcReceipt::into_receipt).transpose()
    }

    async fn chain_id(&self) -> Result<u64, RpcError> {
        if let Some(id) = self.chain_id {
            return Ok(id);
        }
        self.fetch_chain_id().await
    }
}
