//! Offline ABI commands: selector, encode, decode

use covenant_abi::{decode_hex_data, parse_type_list, AbiType, Function, Param, Token};
use covenant_crypto::keccak256;
use covenant_primitives::encode_hex;
use serde_json::Value;

use crate::{output::Output, CliError};

/// Parse one command-line literal per declared type
pub fn parse_args(types: &[AbiType], args: &[String]) -> Result<Vec<Token>, CliError> {
    if types.len() != args.len() {
        return Err(CliError::InvalidInput(format!(
            "expected {} arguments, got {}",
            types.len(),
            args.len()
        )));
    }
    types
        .iter()
        .zip(args)
        .map(|(ty, arg)| Token::parse(ty, arg).map_err(CliError::from))
        .collect()
}

/// Parse a function signature, taking outputs from `returns` when given
pub fn parse_function(signature: &str, returns: Option<&str>) -> Result<Function, CliError> {
    let mut function = Function::parse(signature)?;
    if let Some(returns) = returns {
        function.outputs = parse_type_list(returns)?
            .into_iter()
            .map(Param::unnamed)
            .collect();
    }
    Ok(function)
}

/// Print the selector of a function, or the topic of an event
pub fn selector(signature: &str, event: bool, json: bool) -> Result<(), CliError> {
    let function = Function::parse(signature)?;
    let canonical = function.signature();

    let output = if event {
        let topic = keccak256(canonical.as_bytes()).to_hex();
        Output::new(json)
            .field("signature", canonical.as_str())
            .field("topic", topic.as_str())
            .line(topic)
    } else {
        let selector = encode_hex(&function.selector());
        Output::new(json)
            .field("signature", canonical.as_str())
            .field("selector", selector.as_str())
            .line(selector)
    };
    output.print();
    Ok(())
}

/// Selector-prefixed call data as hex
pub fn encode_call(signature: &str, args: &[String]) -> Result<String, CliError> {
    let function = Function::parse(signature)?;
    let tokens = parse_args(&function.input_types(), args)?;
    Ok(function.encode_input_hex(&tokens)?)
}

/// Print encoded call data
pub fn encode(signature: &str, args: &[String], json: bool) -> Result<(), CliError> {
    let data = encode_call(signature, args)?;
    Output::new(json)
        .field("data", data.as_str())
        .line(data)
        .print();
    Ok(())
}

/// Decode `data` as the comma-separated `types`
pub fn decode_values(types: &str, data: &str) -> Result<Vec<Token>, CliError> {
    let types = parse_type_list(types)?;
    Ok(decode_hex_data(&types, data)?)
}

/// Print decoded values, one per line
pub fn decode(types: &str, data: &str, json: bool) -> Result<(), CliError> {
    let values = decode_values(types, data)?;
    print_tokens(&values, json);
    Ok(())
}

pub(crate) fn print_tokens(values: &[Token], json: bool) {
    let rendered: Vec<String> = values.iter().map(Token::to_string).collect();
    let array = rendered.iter().cloned().map(Value::String).collect();
    Output::new(json)
        .field_value("values", Value::Array(array))
        .line(rendered.join("\n"))
        .print();
}
