//! CLI error types

use covenant_abi::AbiError;
use covenant_contract::ContractError;
use covenant_rpc::RpcError;
use thiserror::Error;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    /// Malformed command-line input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// ABI parsing, encoding or decoding failed
    #[error(transparent)]
    Abi(#[from] AbiError),

    /// Contract invocation failed
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// Node communication failed
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config error
    #[error("Config error: {0}")]
    Config(String),
}
