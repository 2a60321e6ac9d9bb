//! Signing, broadcasting and receipt polling

use std::sync::Arc;

use bytes::Bytes;
use covenant_primitives::{Address, H256, U256};
use covenant_rpc::{BlockId, EthRpc, RpcError};
use covenant_types::{Receipt, TransactionRequest};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::state::{InvocationState, Progress};
use crate::{ContractError, Credentials, EngineConfig};

/// Turns call data into a mined receipt for one account
#[derive(Clone)]
pub struct TransactionSubmitter {
    rpc: Arc<dyn EthRpc>,
    credentials: Arc<dyn Credentials>,
    config: EngineConfig,
}

impl TransactionSubmitter {
    /// Create a submitter
    pub fn new(
        rpc: Arc<dyn EthRpc>,
        credentials: Arc<dyn Credentials>,
        config: EngineConfig,
    ) -> Self {
        Self {
            rpc,
            credentials,
            config,
        }
    }

    /// Sender address
    pub fn address(&self) -> Address {
        self.credentials.address()
    }

    /// Node collaborator
    pub fn rpc(&self) -> &Arc<dyn EthRpc> {
        &self.rpc
    }

    /// Signing collaborator
    pub fn credentials(&self) -> &Arc<dyn Credentials> {
        &self.credentials
    }

    /// Engine settings
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Configured chain ID, else the node's
    pub async fn chain_id(&self) -> Result<u64, ContractError> {
        match self.config.chain_id {
            Some(chain_id) => Ok(chain_id),
            None => Ok(self.rpc.chain_id().await?),
        }
    }

    /// Build and sign a transaction to `to` (`None` deploys).
    ///
    /// The nonce is read from the node's latest block on every call.
    pub async fn sign(
        &self,
        to: Option<Address>,
        data: Bytes,
        value: U256,
    ) -> Result<Bytes, ContractError> {
        let chain_id = self.chain_id().await?;
        let nonce = self
            .rpc
            .get_transaction_count(&self.address(), BlockId::Latest)
            .await?;

        let gas_price = u128::from(self.config.gas_price);
        let gas_limit = self.config.gas_limit;
        let request = match to {
            Some(to) => {
                TransactionRequest::call(nonce, gas_price, gas_limit, to, data).with_value(value)
            }
            None => TransactionRequest::create(nonce, gas_price, gas_limit, value, data),
        };
        debug!(nonce, chain_id, create = request.is_contract_creation(), "Signing transaction");

        self.credentials.sign_transaction(&request, chain_id)
    }

    /// Send a signed transaction. A node rejection is
    /// [`ContractError::TransactionFailed`].
    pub async fn broadcast(&self, raw: &[u8]) -> Result<H256, ContractError> {
        match self.rpc.send_raw_transaction(raw).await {
            Ok(hash) => {
                info!(hash = %hash, "Transaction submitted");
                Ok(hash)
            }
            Err(RpcError::Node {
                code,
                message,
                data,
            }) => Err(ContractError::TransactionFailed {
                reason: message.clone(),
                hash: None,
                source: Some(RpcError::Node {
                    code,
                    message,
                    data,
                }),
            }),
            Err(err) => Err(err.into()),
        }
    }

    /// Poll for the receipt of `hash` until it appears or the receipt
    /// timeout elapses.
    ///
    /// The first poll always runs, even with a zero timeout. Later polls are
    /// bounded by the time left, so the deadline holds even when the node
    /// stalls. Poll errors are logged and retried.
    pub async fn await_receipt(&self, hash: H256) -> Result<Receipt, ContractError> {
        let started = Instant::now();
        let deadline = started + self.config.receipt_timeout();
        let interval = self.config.poll_interval();
        let mut first = true;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() && !first {
                break;
            }
            let bound = if first {
                remaining.max(interval)
            } else {
                remaining
            };
            first = false;

            match tokio::time::timeout(bound, self.rpc.get_transaction_receipt(&hash)).await {
                Ok(Ok(Some(receipt))) => {
                    info!(
                        hash = %hash,
                        block = receipt.block_number,
                        success = receipt.is_success(),
                        "Transaction mined"
                    );
                    return Ok(receipt);
                }
                Ok(Ok(None)) => debug!(hash = %hash, "Receipt not available yet"),
                Ok(Err(err)) => warn!(hash = %hash, error = %err, "Receipt poll failed"),
                Err(_) => break,
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            tokio::time::sleep(interval.min(remaining)).await;
        }

        Err(ContractError::TransactionTimeout {
            hash,
            waited: started.elapsed(),
        })
    }

    /// Sign, broadcast and wait for the receipt
    pub async fn sign_and_send(
        &self,
        to: Option<Address>,
        data: Bytes,
        value: U256,
    ) -> Result<Receipt, ContractError> {
        self.submit(to, data, value, &Progress::none()).await
    }

    pub(crate) async fn submit(
        &self,
        to: Option<Address>,
        data: Bytes,
        value: U256,
        progress: &Progress,
    ) -> Result<Receipt, ContractError> {
        let raw = self.sign(to, data, value).await?;
        progress.set(InvocationState::Signed);

        let hash = self.broadcast(&raw).await?;
        progress.set(InvocationState::Submitted);

        progress.set(InvocationState::Pending);
        let receipt = self.await_receipt(hash).await?;
        progress.set(InvocationState::Mined);
        Ok(receipt)
    }
}

impl std::fmt::Debug for TransactionSubmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionSubmitter")
            .field("address", &self.address())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
