//! Contract bindings: calls, transactions, deployment and events

use std::sync::Arc;

use bytes::Bytes;
use covenant_abi::{AbiError, DecodedEvent, Event, FromToken, Function, Token};
use covenant_primitives::{Address, U256};
use covenant_rpc::{BlockId, CallRequest, EthRpc};
use covenant_types::Receipt;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::state::{InvocationState, Progress};
use crate::{ContractError, Credentials, EngineConfig, InvocationHandle, TransactionSubmitter};

/// A deployed contract reachable through one account
#[derive(Clone, Debug)]
pub struct Contract {
    address: Address,
    submitter: TransactionSubmitter,
    deployment: Option<Receipt>,
}

impl Contract {
    /// Bind to the contract at `address`
    pub fn new(
        address: Address,
        rpc: Arc<dyn EthRpc>,
        credentials: Arc<dyn Credentials>,
        config: EngineConfig,
    ) -> Self {
        Self::with_submitter(address, TransactionSubmitter::new(rpc, credentials, config))
    }

    /// Bind to `address` reusing an existing submitter
    pub fn with_submitter(address: Address, submitter: TransactionSubmitter) -> Self {
        Self {
            address,
            submitter,
            deployment: None,
        }
    }

    /// Contract address
    pub fn address(&self) -> Address {
        self.address
    }

    /// Submitter used for transactions
    pub fn submitter(&self) -> &TransactionSubmitter {
        &self.submitter
    }

    /// Receipt of the deployment, for contracts created by [`Contract::deploy`]
    pub fn deployment_receipt(&self) -> Option<&Receipt> {
        self.deployment.as_ref()
    }

    /// Run a constant function with `eth_call` and decode its outputs
    pub async fn execute_call(
        &self,
        function: &Function,
        args: &[Token],
    ) -> Result<Vec<Token>, ContractError> {
        self.call_tracked(function, args, &Progress::none()).await
    }

    /// First output of a constant function, converted to `T`
    pub async fn call_single<T: FromToken>(
        &self,
        function: &Function,
        args: &[Token],
    ) -> Result<T, ContractError> {
        let outputs = self.execute_call(function, args).await?;
        first_output(outputs)
            .and_then(T::from_token)
            .map_err(|e| ContractError::function_call(function, ContractError::Decoding(e)))
    }

    /// All outputs of a constant function
    pub async fn call_multiple(
        &self,
        function: &Function,
        args: &[Token],
    ) -> Result<Vec<Token>, ContractError> {
        self.execute_call(function, args).await
    }

    /// Send a transaction calling `function` and wait until it is mined.
    ///
    /// A reverted transaction still returns its receipt; check
    /// [`Receipt::is_success`].
    pub async fn execute_transaction(
        &self,
        function: &Function,
        args: &[Token],
    ) -> Result<Receipt, ContractError> {
        self.execute_transaction_with_value(function, args, U256::zero())
            .await
    }

    /// [`execute_transaction`](Self::execute_transaction) transferring `value` wei
    pub async fn execute_transaction_with_value(
        &self,
        function: &Function,
        args: &[Token],
        value: U256,
    ) -> Result<Receipt, ContractError> {
        self.transact_tracked(function, args, value, &Progress::none())
            .await
    }

    /// Deploy `bytecode` followed by `encoded_constructor` and bind to the
    /// created contract
    pub async fn deploy(
        rpc: Arc<dyn EthRpc>,
        credentials: Arc<dyn Credentials>,
        config: EngineConfig,
        bytecode: &[u8],
        encoded_constructor: &[u8],
        value: U256,
    ) -> Result<Contract, ContractError> {
        let submitter = TransactionSubmitter::new(rpc, credentials, config);
        let init_code = init_code(bytecode, encoded_constructor);
        deploy_tracked(submitter, init_code, value, &Progress::none()).await
    }

    /// Deploy, then build a typed binding from the new contract with `factory`
    #[allow(clippy::too_many_arguments)]
    pub async fn deploy_with<B>(
        factory: impl FnOnce(Contract) -> B,
        rpc: Arc<dyn EthRpc>,
        credentials: Arc<dyn Credentials>,
        config: EngineConfig,
        bytecode: &[u8],
        encoded_constructor: &[u8],
        value: U256,
    ) -> Result<B, ContractError> {
        Self::deploy(rpc, credentials, config, bytecode, encoded_constructor, value)
            .await
            .map(factory)
    }

    /// Decode every log in `receipt` emitted by `event`, in log order
    pub fn extract_events(
        event: &Event,
        receipt: &Receipt,
    ) -> Result<Vec<DecodedEvent>, ContractError> {
        event
            .filter_logs(&receipt.logs)
            .map_err(ContractError::Decoding)
    }

    /// [`execute_call`](Self::execute_call) on the worker pool
    pub fn spawn_call(
        &self,
        function: Function,
        args: Vec<Token>,
    ) -> InvocationHandle<Vec<Token>> {
        self.spawn_call_on(None, function, args)
    }

    /// [`execute_transaction_with_value`](Self::execute_transaction_with_value)
    /// on the worker pool
    pub fn spawn_transaction(
        &self,
        function: Function,
        args: Vec<Token>,
        value: U256,
    ) -> InvocationHandle<Receipt> {
        self.spawn_transaction_on(None, function, args, value)
    }

    /// [`deploy`](Self::deploy) on the worker pool
    pub fn spawn_deploy(
        rpc: Arc<dyn EthRpc>,
        credentials: Arc<dyn Credentials>,
        config: EngineConfig,
        bytecode: &[u8],
        encoded_constructor: &[u8],
        value: U256,
    ) -> InvocationHandle<Contract> {
        let submitter = TransactionSubmitter::new(rpc, credentials, config);
        spawn_deploy_on(None, submitter, init_code(bytecode, encoded_constructor), value)
    }

    pub(crate) fn spawn_call_on(
        &self,
        runtime: Option<&Handle>,
        function: Function,
        args: Vec<Token>,
    ) -> InvocationHandle<Vec<Token>> {
        let contract = self.clone();
        InvocationHandle::spawn(runtime, move |progress| async move {
            contract.call_tracked(&function, &args, &progress).await
        })
    }

    pub(crate) fn spawn_transaction_on(
        &self,
        runtime: Option<&Handle>,
        function: Function,
        args: Vec<Token>,
        value: U256,
    ) -> InvocationHandle<Receipt> {
        let contract = self.clone();
        InvocationHandle::spawn(runtime, move |progress| async move {
            contract
                .transact_tracked(&function, &args, value, &progress)
                .await
        })
    }

    async fn call_tracked(
        &self,
        function: &Function,
        args: &[Token],
        progress: &Progress,
    ) -> Result<Vec<Token>, ContractError> {
        let result = self
            .call_inner(function, args, progress)
            .await
            .map_err(|e| ContractError::function_call(function, e));
        settle(progress, result)
    }

    async fn call_inner(
        &self,
        function: &Function,
        args: &[Token],
        progress: &Progress,
    ) -> Result<Vec<Token>, ContractError> {
        let data = function.encode_input(args).map_err(ContractError::Encoding)?;
        progress.set(InvocationState::Encoded);

        debug!(function = %function, contract = %self.address, "Calling");
        let request = CallRequest::new(self.address, data).with_from(self.submitter.address());
        let output = self.submitter.rpc().call(&request, BlockId::Latest).await?;

        let outputs = function
            .decode_output(&output)
            .map_err(ContractError::Decoding)?;
        progress.set(InvocationState::Called);
        Ok(outputs)
    }

    async fn transact_tracked(
        &self,
        function: &Function,
        args: &[Token],
        value: U256,
        progress: &Progress,
    ) -> Result<Receipt, ContractError> {
        let result = self
            .transact_inner(function, args, value, progress)
            .await
            .map_err(|e| ContractError::function_call(function, e));
        settle(progress, result)
    }

    async fn transact_inner(
        &self,
        function: &Function,
        args: &[Token],
        value: U256,
        progress: &Progress,
    ) -> Result<Receipt, ContractError> {
        let data = function.encode_input(args).map_err(ContractError::Encoding)?;
        progress.set(InvocationState::Encoded);

        let receipt = self
            .submitter
            .submit(Some(self.address), Bytes::from(data), value, progress)
            .await?;
        if !receipt.is_success() {
            warn!(
                function = %function,
                hash = %receipt.transaction_hash,
                "Transaction reverted"
            );
        }
        Ok(receipt)
    }
}

fn init_code(bytecode: &[u8], encoded_constructor: &[u8]) -> Bytes {
    let mut code = Vec::with_capacity(bytecode.len() + encoded_constructor.len());
    code.extend_from_slice(bytecode);
    code.extend_from_slice(encoded_constructor);
    Bytes::from(code)
}

fn first_output(outputs: Vec<Token>) -> Result<Token, AbiError> {
    outputs
        .into_iter()
        .next()
        .ok_or_else(|| AbiError::Decoding("function returned no values".to_string()))
}

fn spawn_deploy_on(
    runtime: Option<&Handle>,
    submitter: TransactionSubmitter,
    init_code: Bytes,
    value: U256,
) -> InvocationHandle<Contract> {
    InvocationHandle::spawn(runtime, move |progress| async move {
        deploy_tracked(submitter, init_code, value, &progress).await
    })
}

async fn deploy_tracked(
    submitter: TransactionSubmitter,
    init_code: Bytes,
    value: U256,
    progress: &Progress,
) -> Result<Contract, ContractError> {
    let result = deploy_inner(submitter, init_code, value, progress).await;
    settle(progress, result)
}

async fn deploy_inner(
    submitter: TransactionSubmitter,
    init_code: Bytes,
    value: U256,
    progress: &Progress,
) -> Result<Contract, ContractError> {
    progress.set(InvocationState::Encoded);
    let receipt = submitter.submit(None, init_code, value, progress).await?;

    if !receipt.is_success() {
        return Err(ContractError::TransactionFailed {
            reason: format!("deployment reverted in block {}", receipt.block_number),
            hash: Some(receipt.transaction_hash),
            source: None,
        });
    }
    let address = receipt
        .contract_address
        .ok_or(ContractError::MissingContractAddress {
            hash: receipt.transaction_hash,
        })?;

    info!(address = %address, hash = %receipt.transaction_hash, "Contract deployed");
    Ok(Contract {
        address,
        submitter,
        deployment: Some(receipt),
    })
}

/// Publish the terminal state of a failed invocation
fn settle<T>(progress: &Progress, result: Result<T, ContractError>) -> Result<T, ContractError> {
    if let Err(err) = &result {
        warn!(error = %err, "Invocation failed");
        progress.set(if err.is_timeout() {
            InvocationState::TimedOut
        } else {
            InvocationState::Failed
        });
    }
    result
}

pub(crate) fn spawn_deploy_with_runtime(
    runtime: &Handle,
    submitter: TransactionSubmitter,
    bytecode: &[u8],
    encoded_constructor: &[u8],
    value: U256,
) -> InvocationHandle<Contract> {
    spawn_deploy_on(Some(runtime), submitter, init_code(bytecode, encoded_constructor), value)
}
