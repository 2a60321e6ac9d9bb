//! Request and response shapes of the JSON-RPC methods in use

use bytes::Bytes;
use covenant_primitives::{decode_hex, encode_hex, Address, H256, U256};
use covenant_types::{Log, Receipt, TxStatus};
use serde::{Deserialize, Serialize};

use crate::RpcError;

/// Block identifier for RPC queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockId {
    /// Block number
    Number(u64),
    /// Latest block
    #[default]
    Latest,
    /// Pending block (includes pending transactions)
    Pending,
    /// Earliest block (genesis)
    Earliest,
}

impl Serialize for BlockId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            BlockId::Number(n) => serializer.serialize_str(&format!("0x{:x}", n)),
            BlockId::Latest => serializer.serialize_str("latest"),
            BlockId::Pending => serializer.serialize_str("pending"),
            BlockId::Earliest => serializer.serialize_str("earliest"),
        }
    }
}

/// Call request for `eth_call`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallRequest {
    /// Sender address
    pub from: Option<Address>,
    /// Recipient address
    pub to: Option<Address>,
    /// Gas limit
    pub gas: Option<u64>,
    /// Gas price
    pub gas_price: Option<u128>,
    /// Value to transfer
    pub value: Option<U256>,
    /// Input data
    pub data: Option<Bytes>,
}

impl CallRequest {
    /// Call `to` with `data`
    pub fn new(to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            to: Some(to),
            data: Some(data.into()),
            ..Default::default()
        }
    }

    /// Set the sender
    pub fn with_from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }
}

impl Serialize for CallRequest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let count = [
            self.from.is_some(),
            self.to.is_some(),
            self.gas.is_some(),
            self.gas_price.is_some(),
            self.value.is_some(),
            self.data.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count();

        let mut map = serializer.serialize_map(Some(count))?;

        if let Some(from) = &self.from {
            map.serialize_entry("from", &from.to_hex())?;
        }
        if let Some(to) = &self.to {
            map.serialize_entry("to", &to.to_hex())?;
        }
        if let Some(gas) = &self.gas {
            map.serialize_entry("gas", &format!("0x{:x}", gas))?;
        }
        if let Some(gas_price) = &self.gas_price {
            map.serialize_entry("gasPrice", &format!("0x{:x}", gas_price))?;
        }
        if let Some(value) = &self.value {
            map.serialize_entry("value", &format!("0x{:x}", value))?;
        }
        if let Some(data) = &self.data {
            map.serialize_entry("data", &encode_hex(data))?;
        }

        map.end()
    }
}

/// Receipt as returned by `eth_getTransactionReceipt`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RpcReceipt {
    transaction_hash: String,
    block_number: Option<String>,
    status: Option<String>,
    gas_used: String,
    contract_address: Option<String>,
    #[serde(default)]
    logs: Vec<RpcLog>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RpcLog {
    address: String,
    #[serde(default)]
    topics: Vec<String>,
    #[serde(default)]
    data: String,
}

impl RpcReceipt {
    pub(crate) fn into_receipt(self) -> Result<Receipt, RpcError> {
        let block_number = self
            .block_number
            .as_deref()
            .ok_or_else(|| RpcError::InvalidResponse("receipt without block number".into()))
            .and_then(parse_hex_u64)?;

        // Receipts from before EIP-658 carry a state root instead of a status
        let status = match self.status.as_deref() {
            Some(s) => TxStatus::from(parse_hex_u64(s)? == 1),
            None => TxStatus::Success,
        };

        let contract_address = self
            .contract_address
            .as_deref()
            .map(parse_address)
            .transpose()?;

        let logs = self
            .logs
            .into_iter()
            .map(RpcLog::into_log)
            .collect::<Result<Vec<_>, _>>()?;

        let mut receipt = Receipt::new(
            parse_h256(&self.transaction_hash)?,
            block_number,
            status,
            parse_hex_u64(&self.gas_used)?,
        )
        .with_logs(logs);
        receipt.contract_address = contract_address;
        Ok(receipt)
    }
}

impl RpcLog {
    fn into_log(self) -> Result<Log, RpcError> {
        let topics = self
            .topics
            .iter()
            .map(|t| parse_h256(t))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Log::new(
            parse_address(&self.address)?,
            topics,
            parse_hex_bytes(&self.data)?,
        ))
    }
}

pub(crate) fn parse_hex_u64(s: &str) -> Result<u64, RpcError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(digits, 16)
        .map_err(|e| RpcError::InvalidResponse(format!("quantity {:?}: {}", s, e)))
}

pub(crate) fn parse_hex_u128(s: &str) -> Result<u128, RpcError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    u128::from_str_radix(digits, 16)
        .map_err(|e| RpcError::InvalidResponse(format!("quantity {:?}: {}", s, e)))
}

pub(crate) fn parse_hex_bytes(s: &str) -> Result<Bytes, RpcError> {
    decode_hex(s)
        .map(Bytes::from)
        .map_err(|e| RpcError::InvalidResponse(format!("data {:?}: {}", s, e)))
}

pub(crate) fn parse_h256(s: &str) -> Result<H256, RpcError> {
    H256::from_hex(s).map_err(|e| RpcError::InvalidResponse(format!("hash {:?}: {}", s, e)))
}

pub(crate) fn parse_address(s: &str) -> Result<Address, RpcError> {
    Address::from_hex(s).map_err(|e| RpcError::InvalidResponse(format!("address {:?}: {}", s, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_block_id_serialization() {
        assert_eq!(serde_json::to_value(BlockId::Latest).unwrap(), json!("latest"));
        assert_eq!(serde_json::to_value(BlockId::Number(255)).unwrap(), json!("0xff"));
    }

    #[test]
    fn test_call_request_serialization() {
        let to = Address::from_bytes([0x11; 20]);
        let request = CallRequest::new(to, vec![0xab, 0xcd]).with_from(Address::ZERO);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "from": "0x0000000000000000000000000000000000000000",
                "to": "0x1111111111111111111111111111111111111111",
                "data": "0xabcd",
            })
        );

        let with_value = CallRequest {
            value: Some(U256::from(255)),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&with_value).unwrap(),
            json!({ "value": "0xff" })
        );
    }

    #[test]
    fn test_parse_receipt() {
        let raw = json!({
            "transactionHash": "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b",
            "blockNumber": "0x1b4",
            "status": "0x1",
            "gasUsed": "0x5208",
            "contractAddress": null,
            "logs": [{
                "address": "0x1111111111111111111111111111111111111111",
                "topics": ["0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"],
                "data": "0x"
            }]
        });
        let receipt = serde_json::from_value::<RpcReceipt>(raw)
            .unwrap()
            .into_receipt()
            .unwrap();
        assert_eq!(receipt.block_number, 436);
        assert!(receipt.is_success());
        assert_eq!(receipt.gas_used, 21_000);
        assert!(receipt.contract_address.is_none());
        assert_eq!(receipt.logs.len(), 1);
        assert!(receipt.logs[0].data.is_empty());
    }

    #[test]
    fn test_parse_reverted_deploy_receipt() {
        let raw = json!({
            "transactionHash": "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b",
            "blockNumber": "0x1",
            "status": "0x0",
            "gasUsed": "0x10",
            "contractAddress": "0x5fbdb2315678afecb367f032d93f642f64180aa3",
        });
        let receipt = serde_json::from_value::<RpcReceipt>(raw)
            .unwrap()
            .into_receipt()
            .unwrap();
        assert!(!receipt.is_success());
        assert!(receipt.logs.is_empty());
        assert_eq!(
            receipt.contract_address.unwrap().to_hex(),
            "0x5fbdb2315678afecb367f032d93f642f64180aa3"
        );
    }

    #[test]
    fn test_parse_receipt_bad_hash() {
        let raw = json!({
            "transactionHash": "0x1234",
            "blockNumber": "0x1",
            "status": "0x1",
            "gasUsed": "0x1",
        });
        let result = serde_json::from_value::<RpcReceipt>(raw).unwrap().into_receipt();
        assert!(matches!(result, Err(RpcError::InvalidResponse(_))));
    }

    #[test]
    fn test_parse_hex_helpers() {
        assert_eq!(parse_hex_u64("0x100").unwrap(), 256);
        assert_eq!(parse_hex_u64("100").unwrap(), 256);
        assert_eq!(parse_hex_u128("0x3b9aca00").unwrap(), 1_000_000_000);
        assert!(parse_hex_bytes("0x").unwrap().is_empty());
        assert_eq!(parse_hex_bytes("0x1234").unwrap().as_ref(), &[0x12, 0x34]);
        assert!(parse_hex_u64("0xzz").is_err());
    }
}
