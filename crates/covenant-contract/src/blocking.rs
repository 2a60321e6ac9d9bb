//! Synchronous facade over [`Contract`]

use std::sync::Arc;

use covenant_abi::{DecodedEvent, Event, FromToken, Function, Token};
use covenant_primitives::{Address, U256};
use covenant_rpc::EthRpc;
use covenant_types::Receipt;
use tokio::runtime::{Builder, Runtime};

use crate::contract::spawn_deploy_with_runtime;
use crate::{
    Contract, ContractError, Credentials, EngineConfig, InvocationHandle, TransactionSubmitter,
};

/// A [`Contract`] driven from synchronous code.
///
/// Owns a multi-thread runtime; each method blocks the calling thread until
/// the operation finishes. Must not be used from inside an async context.
pub struct BlockingContract {
    runtime: Arc<Runtime>,
    inner: Contract,
}

fn build_runtime() -> Result<Runtime, ContractError> {
    Builder::new_multi_thread()
        .enable_all()
        .thread_name("covenant-worker")
        .build()
        .map_err(|e| ContractError::Worker(format!("failed to start runtime: {}", e)))
}

impl BlockingContract {
    /// Bind to the contract at `address`
    pub fn new(
        address: Address,
        rpc: Arc<dyn EthRpc>,
        credentials: Arc<dyn Credentials>,
        config: EngineConfig,
    ) -> Result<Self, ContractError> {
        Ok(Self {
            runtime: Arc::new(build_runtime()?),
            inner: Contract::new(address, rpc, credentials, config),
        })
    }

    /// Deploy and bind to the created contract
    pub fn deploy(
        rpc: Arc<dyn EthRpc>,
        credentials: Arc<dyn Credentials>,
        config: EngineConfig,
        bytecode: &[u8],
        encoded_constructor: &[u8],
        value: U256,
    ) -> Result<Self, ContractError> {
        let runtime = Arc::new(build_runtime()?);
        let submitter = TransactionSubmitter::new(rpc, credentials, config);
        let handle = spawn_deploy_with_runtime(
            runtime.handle(),
            submitter,
            bytecode,
            encoded_constructor,
            value,
        );
        let inner = runtime.block_on(handle)?;
        Ok(Self { runtime, inner })
    }

    /// Underlying async binding
    pub fn contract(&self) -> &Contract {
        &self.inner
    }

    /// Contract address
    pub fn address(&self) -> Address {
        self.inner.address()
    }

    /// See [`Contract::execute_call`]
    pub fn execute_call(
        &self,
        function: &Function,
        args: &[Token],
    ) -> Result<Vec<Token>, ContractError> {
        self.runtime.block_on(self.inner.execute_call(function, args))
    }

    /// See [`Contract::call_single`]
    pub fn call_single<T: FromToken>(
        &self,
        function: &Function,
        args: &[Token],
    ) -> Result<T, ContractError> {
        self.runtime.block_on(self.inner.call_single(function, args))
    }

    /// See [`Contract::execute_transaction`]
    pub fn execute_transaction(
        &self,
        function: &Function,
        args: &[Token],
    ) -> Result<Receipt, ContractError> {
        self.runtime
            .block_on(self.inner.execute_transaction(function, args))
    }

    /// See [`Contract::execute_transaction_with_value`]
    pub fn execute_transaction_with_value(
        &self,
        function: &Function,
        args: &[Token],
        value: U256,
    ) -> Result<Receipt, ContractError> {
        self.runtime
            .block_on(self.inner.execute_transaction_with_value(function, args, value))
    }

    /// See [`Contract::extract_events`]
    pub fn extract_events(
        &self,
        event: &Event,
        receipt: &Receipt,
    ) -> Result<Vec<DecodedEvent>, ContractError> {
        Contract::extract_events(event, receipt)
    }

    /// Start a call on the owned runtime without blocking
    pub fn spawn_call(
        &self,
        function: Function,
        args: Vec<Token>,
    ) -> InvocationHandle<Vec<Token>> {
        self.inner
            .spawn_call_on(Some(self.runtime.handle()), function, args)
    }

    /// Start a transaction on the owned runtime without blocking
    pub fn spawn_transaction(
        &self,
        function: Function,
        args: Vec<Token>,
        value: U256,
    ) -> InvocationHandle<Receipt> {
        self.inner
            .spawn_transaction_on(Some(self.runtime.handle()), function, args, value)
    }

    /// Block until a spawned invocation finishes
    pub fn wait<T>(&self, handle: InvocationHandle<T>) -> Result<T, ContractError> {
        self.runtime.block_on(handle)
    }
}

impl std::fmt::Debug for BlockingContract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingContract")
            .field("contract", &self.inner)
            .finish_non_exhaustive()
    }
}
