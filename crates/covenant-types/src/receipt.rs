//! Receipts and logs reported for mined transactions

use bytes::Bytes;
use covenant_primitives::{Address, H256};

/// Execution status recorded in a receipt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxStatus {
    /// Execution reverted
    Failure = 0,
    /// Execution succeeded
    Success = 1,
}

impl From<bool> for TxStatus {
    fn from(success: bool) -> Self {
        if success {
            TxStatus::Success
        } else {
            TxStatus::Failure
        }
    }
}

/// Log entry emitted during execution
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Log {
    /// Emitting contract
    pub address: Address,
    /// Indexed topics, 32 bytes each
    pub topics: Vec<H256>,
    /// Non-indexed data, a multiple of 32 bytes
    pub data: Bytes,
}

impl Log {
    /// Create a new log entry
    pub fn new(address: Address, topics: Vec<H256>, data: impl Into<Bytes>) -> Self {
        Self {
            address,
            topics,
            data: data.into(),
        }
    }

    /// First topic, the event signature hash for non-anonymous events
    pub fn topic0(&self) -> Option<&H256> {
        self.topics.first()
    }
}

/// Confirmation record of a mined transaction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    /// Hash of the transaction
    pub transaction_hash: H256,
    /// Block that included it
    pub block_number: u64,
    /// Execution status
    pub status: TxStatus,
    /// Gas consumed by this transaction
    pub gas_used: u64,
    /// Address of the created contract, for creations
    pub contract_address: Option<Address>,
    /// Logs in emission order
    pub logs: Vec<Log>,
}

impl Receipt {
    /// Receipt without logs or created contract
    pub fn new(transaction_hash: H256, block_number: u64, status: TxStatus, gas_used: u64) -> Self {
        Self {
            transaction_hash,
            block_number,
            status,
            gas_used,
            contract_address: None,
            logs: Vec::new(),
        }
    }

    /// Attach the created contract address
    pub fn with_contract_address(mut self, address: Address) -> Self {
        self.contract_address = Some(address);
        self
    }

    /// Attach logs
    pub fn with_logs(mut self, logs: Vec<Log>) -> Self {
        self.logs = logs;
        self
    }

    /// Check if execution succeeded
    pub fn is_success(&self) -> bool {
        self.status == TxStatus::Success
    }
}
