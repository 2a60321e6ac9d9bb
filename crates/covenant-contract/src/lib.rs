//! # covenant-contract
//!
//! Invocation engine for deployed contracts:
//! - [`Contract`]: `eth_call` reads, signed transactions, deployment and
//!   event extraction, each as an async method
//! - [`InvocationHandle`]: the same operations spawned on the tokio worker
//!   pool, with observable [`InvocationState`]
//! - [`BlockingContract`]: synchronous facade owning its own runtime
//! - [`TransactionSubmitter`]: nonce lookup, signing, broadcast and
//!   deadline-bounded receipt polling
//!
//! ```no_run
//! use std::sync::Arc;
//! use covenant_abi::{Function, Token};
//! use covenant_contract::{Contract, EngineConfig, Wallet};
//! use covenant_primitives::{Address, U256};
//! use covenant_rpc::RpcClient;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let rpc = Arc::new(RpcClient::connect("http://localhost:8545").await?);
//! let wallet = Arc::new(Wallet::new_random());
//! let token = Contract::new(Address::ZERO, rpc, wallet, EngineConfig::default());
//!
//! let balance_of = Function::parse("balanceOf(address)(uint256)")?;
//! let balance: U256 = token
//!     .call_single(&balance_of, &[Token::Address(Address::ZERO)])
//!     .await?;
//! println!("balance: {}", balance);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod blocking;
mod config;
mod contract;
mod credentials;
mod error;
mod handle;
mod state;
mod submitter;

pub use blocking::BlockingContract;
pub use config::EngineConfig;
pub use contract::Contract;
pub use credentials::{Credentials, Wallet};
pub use error::ContractError;
pub use handle::InvocationHandle;
pub use state::InvocationState;
pub use submitter::TransactionSubmitter;
