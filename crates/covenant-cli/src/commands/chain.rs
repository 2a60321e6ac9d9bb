//! Commands that talk to a node: call, send, deploy

use std::sync::Arc;

use covenant_abi::{encode, parse_type_list};
use covenant_contract::{Contract, Wallet};
use covenant_primitives::{decode_hex, Address, U256};
use covenant_rpc::RpcClient;
use covenant_types::Receipt;
use tracing::debug;

use crate::commands::abi::{parse_args, parse_function, print_tokens};
use crate::{config::CliConfig, output::Output, CliError};

fn client(config: &CliConfig) -> Arc<RpcClient> {
    debug!(url = %config.rpc_url, "Connecting");
    let client = RpcClient::http(&config.rpc_url);
    Arc::new(match config.engine.chain_id {
        Some(chain_id) => client.with_chain_id(chain_id),
        None => client,
    })
}

fn parse_address(s: &str) -> Result<Address, CliError> {
    Address::from_hex(s).map_err(|e| CliError::InvalidInput(format!("address {:?}: {}", s, e)))
}

fn parse_value(value: Option<&str>) -> Result<U256, CliError> {
    match value {
        None => Ok(U256::zero()),
        Some(s) => U256::from_dec_str(s)
            .map_err(|e| CliError::InvalidInput(format!("value {:?}: {:?}", s, e))),
    }
}

fn wallet(key: &str) -> Result<Arc<Wallet>, CliError> {
    Ok(Arc::new(Wallet::from_private_key_hex(key)?))
}

fn print_receipt(receipt: &Receipt, json: bool) {
    let status = if receipt.is_success() { "success" } else { "reverted" };
    let mut output = Output::new(json)
        .field("transaction_hash", receipt.transaction_hash.to_hex())
        .field("block_number", receipt.block_number.to_string())
        .field("gas_used", receipt.gas_used.to_string())
        .field("status", status)
        .line(format!("Transaction: {}", receipt.transaction_hash))
        .line(format!("Block: {}", receipt.block_number))
        .line(format!("Gas used: {}", receipt.gas_used))
        .line(format!("Status: {}", status));
    if let Some(address) = receipt.contract_address {
        output = output
            .field("contract_address", address.to_hex())
            .line(format!("Contract: {}", address));
    }
    output.print();
}

/// Run a constant function and print its outputs
pub async fn call(
    config: &CliConfig,
    to: &str,
    signature: &str,
    args: &[String],
    returns: Option<&str>,
    key: Option<&str>,
    json: bool,
) -> Result<(), CliError> {
    let function = parse_function(signature, returns)?;
    let tokens = parse_args(&function.input_types(), args)?;
    let credentials = match key {
        Some(key) => wallet(key)?,
        // eth_call only needs a sender address
        None => Arc::new(Wallet::new_random()),
    };

    let to = parse_address(to)?;
    let contract = Contract::new(to, client(config), credentials, config.engine.clone());
    let values = contract.call_multiple(&function, &tokens).await?;
    print_tokens(&values, json);
    Ok(())
}

/// Send a transaction calling a function and print its receipt
pub async fn send(
    config: &CliConfig,
    to: &str,
    signature: &str,
    args: &[String],
    value: Option<&str>,
    key: &str,
    json: bool,
) -> Result<(), CliError> {
    let function = parse_function(signature, None)?;
    let tokens = parse_args(&function.input_types(), args)?;
    let value = parse_value(value)?;

    let to = parse_address(to)?;
    let contract = Contract::new(to, client(config), wallet(key)?, config.engine.clone());
    let receipt = contract
        .execute_transaction_with_value(&function, &tokens, value)
        .await?;
    print_receipt(&receipt, json);
    Ok(())
}

/// Deploy bytecode with optional constructor arguments
pub async fn deploy(
    config: &CliConfig,
    bytecode: &str,
    constructor: Option<&str>,
    args: &[String],
    value: Option<&str>,
    key: &str,
    json: bool,
) -> Result<(), CliError> {
    let bytecode = decode_hex(bytecode)
        .map_err(|e| CliError::InvalidInput(format!("bytecode: {}", e)))?;
    let types = match constructor {
        Some(types) => parse_type_list(types)?,
        None => Vec::new(),
    };
    let encoded = encode(&types, &parse_args(&types, args)?)?;
    let value = parse_value(value)?;

    let contract = Contract::deploy(
        client(config),
        wallet(key)?,
        config.engine.clone(),
        &bytecode,
        &encoded,
        value,
    )
    .await?;

    match contract.deployment_receipt() {
        Some(receipt) => print_receipt(receipt, json),
        None => Output::new(json)
            .field("contract_address", contract.address().to_hex())
            .line(format!("Contract: {}", contract.address()))
            .print(),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value(None).unwrap(), U256::zero());
        assert_eq!(parse_value(Some("1000")).unwrap(), U256::from(1000));
        assert!(parse_value(Some("1.5")).is_err());
    }

    #[test]
    fn test_parse_address() {
        assert!(parse_address("0x1111111111111111111111111111111111111111").is_ok());
        assert!(matches!(parse_address("0x11"), Err(CliError::InvalidInput(_))));
    }
}
