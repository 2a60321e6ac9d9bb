//! Invocation engine error types

use std::time::Duration;

use covenant_abi::AbiError;
use covenant_primitives::H256;
use covenant_rpc::RpcError;
use thiserror::Error;

/// Error raised by a contract invocation
#[derive(Debug, Error)]
pub enum ContractError {
    /// Arguments did not match the function's inputs
    #[error("ABI encoding failed: {0}")]
    Encoding(#[source] AbiError),

    /// Returned data or log data did not match the declared types
    #[error("ABI decoding failed: {0}")]
    Decoding(#[source] AbiError),

    /// Node could not be reached or answered malformed data
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// Credentials could not sign the transaction
    #[error("signing failed: {0}")]
    Signing(String),

    /// The node rejected the transaction, or a deployment reverted
    #[error("transaction failed: {reason}")]
    TransactionFailed {
        /// Human-readable cause
        reason: String,
        /// Hash, when the transaction reached the chain
        hash: Option<H256>,
        /// Node error behind a rejected broadcast
        #[source]
        source: Option<RpcError>,
    },

    /// No receipt appeared before the deadline. The transaction may still
    /// be mined later.
    #[error("transaction {hash} not mined after {waited:?}")]
    TransactionTimeout {
        /// Hash of the broadcast transaction
        hash: H256,
        /// Time spent polling
        waited: Duration,
    },

    /// Deployment was mined successfully but reported no contract address
    #[error("deployment {hash} produced no contract address")]
    MissingContractAddress {
        /// Hash of the deployment transaction
        hash: H256,
    },

    /// A call or transaction against a contract function failed
    #[error("call to {function} failed: {source}")]
    FunctionCallFailed {
        /// Canonical signature of the function
        function: String,
        /// Underlying failure
        #[source]
        source: Box<ContractError>,
    },

    /// Background task panicked, was aborted, or no runtime was available
    #[error("worker error: {0}")]
    Worker(String),

    /// Invalid engine configuration
    #[error("config error: {0}")]
    Config(String),
}

impl ContractError {
    pub(crate) fn function_call(function: &covenant_abi::Function, source: ContractError) -> Self {
        ContractError::FunctionCallFailed {
            function: function.signature(),
            source: Box::new(source),
        }
    }

    /// Innermost error, looking through [`ContractError::FunctionCallFailed`]
    pub fn root_cause(&self) -> &ContractError {
        match self {
            ContractError::FunctionCallFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// True when polling gave up before a receipt appeared
    pub fn is_timeout(&self) -> bool {
        matches!(self.root_cause(), ContractError::TransactionTimeout { .. })
    }

    /// True when the transaction was broadcast and its outcome is unknown.
    ///
    /// Resubmitting in this case risks executing twice.
    pub fn may_be_on_chain(&self) -> bool {
        self.is_timeout()
    }

    /// Hash of the transaction involved, if one was broadcast
    pub fn transaction_hash(&self) -> Option<H256> {
        match self.root_cause() {
            ContractError::TransactionTimeout { hash, .. }
            | ContractError::MissingContractAddress { hash } => Some(*hash),
            ContractError::TransactionFailed { hash, .. } => *hash,
            _ => None,
        }
    }
}
