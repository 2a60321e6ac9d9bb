//! In-memory node used by the engine tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use covenant_contract::{ContractError, Credentials, EngineConfig, Wallet};
use covenant_crypto::keccak256;
use covenant_primitives::{Address, H256};
use covenant_rpc::{BlockId, CallRequest, EthRpc, RpcError};
use covenant_types::{Log, Receipt, TransactionRequest, TxStatus};

pub const CHAIN_ID: u64 = 1337;
pub const DEPLOYED: Address = Address::from_bytes([0xcc; 20]);
pub const HARDHAT_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// How the node treats broadcast transactions
#[derive(Debug, Clone, Default)]
pub struct Behaviour {
    /// Reject every broadcast with this message
    pub reject: Option<String>,
    /// Accept broadcasts but never produce receipts
    pub never_mine: bool,
    /// Mine with failure status
    pub revert: bool,
    /// Mine creations without a contract address
    pub omit_address: bool,
    /// Logs attached to every receipt
    pub logs: Vec<Log>,
    /// Data returned from `eth_call`
    pub call_output: Vec<u8>,
}

#[derive(Default)]
struct Chain {
    next_nonce: u64,
    sent_nonces: Vec<u64>,
    receipts: HashMap<H256, Receipt>,
    receipt_polls: usize,
    calls: Vec<CallRequest>,
    block: u64,
}

pub struct FakeNode {
    behaviour: Behaviour,
    chain: Mutex<Chain>,
}

impl FakeNode {
    pub fn new(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            chain: Mutex::new(Chain::default()),
        })
    }

    pub fn mining() -> Arc<Self> {
        Self::new(Behaviour::default())
    }

    /// Nonces of every accepted broadcast, in arrival order
    pub fn sent_nonces(&self) -> Vec<u64> {
        self.chain.lock().unwrap().sent_nonces.clone()
    }

    pub fn receipt_polls(&self) -> usize {
        self.chain.lock().unwrap().receipt_polls
    }

    pub fn calls(&self) -> Vec<CallRequest> {
        self.chain.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl EthRpc for FakeNode {
    async fn call(&self, request: &CallRequest, _block: BlockId) -> Result<Bytes, RpcError> {
        self.chain.lock().unwrap().calls.push(request.clone());
        Ok(Bytes::from(self.behaviour.call_output.clone()))
    }

    async fn get_transaction_count(
        &self,
        _address: &Address,
        _block: BlockId,
    ) -> Result<u64, RpcError> {
        Ok(self.chain.lock().unwrap().next_nonce)
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<H256, RpcError> {
        if let Some(reason) = &self.behaviour.reject {
            return Err(RpcError::node(-32000, reason.clone()));
        }

        let tx = rlp::Rlp::new(raw);
        let nonce: u64 = tx
            .val_at(0)
            .map_err(|e| RpcError::node(-32602, e.to_string()))?;
        let is_creation = tx
            .at(3)
            .map(|to| to.is_empty())
            .map_err(|e| RpcError::node(-32602, e.to_string()))?;
        let hash = keccak256(raw);

        let mut chain = self.chain.lock().unwrap();
        if nonce != chain.next_nonce {
            return Err(RpcError::node(-32000, "nonce too low"));
        }
        chain.next_nonce += 1;
        chain.sent_nonces.push(nonce);

        if !self.behaviour.never_mine {
            chain.block += 1;
            let status = TxStatus::from(!self.behaviour.revert);
            let mut receipt =
                Receipt::new(hash, chain.block, status, 21_000).with_logs(self.behaviour.logs.clone());
            if is_creation && !self.behaviour.omit_address {
                receipt = receipt.with_contract_address(DEPLOYED);
            }
            chain.receipts.insert(hash, receipt);
        }
        Ok(hash)
    }

    async fn get_transaction_receipt(&self, hash: &H256) -> Result<Option<Receipt>, RpcError> {
        let mut chain = self.chain.lock().unwrap();
        chain.receipt_polls += 1;
        Ok(chain.receipts.get(hash).cloned())
    }

    async fn chain_id(&self) -> Result<u64, RpcError> {
        Ok(CHAIN_ID)
    }
}

/// Signer that always fails
pub struct BrokenSigner;

impl Credentials for BrokenSigner {
    fn address(&self) -> Address {
        Address::from_bytes([0xee; 20])
    }

    fn sign_transaction(
        &self,
        _request: &TransactionRequest,
        _chain_id: u64,
    ) -> Result<Bytes, ContractError> {
        Err(ContractError::Signing("hardware wallet unplugged".to_string()))
    }
}

pub fn wallet() -> Arc<Wallet> {
    Arc::new(Wallet::from_private_key_hex(HARDHAT_KEY).unwrap())
}

/// Fast polling for tests
pub fn config() -> EngineConfig {
    EngineConfig::default()
        .with_poll_interval(std::time::Duration::from_millis(10))
        .with_receipt_timeout(std::time::Duration::from_secs(5))
}
