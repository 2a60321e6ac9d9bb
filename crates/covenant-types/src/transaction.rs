//! Unsigned transaction requests and their EIP-155 RLP forms

use bytes::Bytes;
use covenant_crypto::{keccak256, Signature};
use covenant_primitives::{Address, H256, U256};
use rlp::{Encodable, RlpStream};

/// A legacy (type 0) transaction awaiting a signature
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct TransactionRequest {
    /// Sender nonce
    pub nonce: u64,
    /// Gas price in wei
    pub gas_price: u128,
    /// Gas limit
    pub gas_limit: u64,
    /// Recipient; `None` creates a contract
    pub to: Option<Address>,
    /// Value transferred in wei
    pub value: U256,
    /// Call data, or init code for a creation
    pub data: Bytes,
}

impl TransactionRequest {
    /// Request calling `to` with `data`
    pub fn call(nonce: u64, gas_price: u128, gas_limit: u64, to: Address, data: Bytes) -> Self {
        Self {
            nonce,
            gas_price,
            gas_limit,
            to: Some(to),
            value: U256::zero(),
            data,
        }
    }

    /// Request deploying `init_code`
    pub fn create(
        nonce: u64,
        gas_price: u128,
        gas_limit: u64,
        value: U256,
        init_code: Bytes,
    ) -> Self {
        Self {
            nonce,
            gas_price,
            gas_limit,
            to: None,
            value,
            data: init_code,
        }
    }

    /// Set the transferred value
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// True when the request deploys a contract
    pub fn is_contract_creation(&self) -> bool {
        self.to.is_none()
    }

    /// EIP-155 signing payload: `rlp([nonce, gasPrice, gas, to, value, data, chainId, 0, 0])`
    pub fn signing_payload(&self, chain_id: u64) -> Vec<u8> {
        let mut stream = RlpStream::new_list(9);
        self.append_fields(&mut stream);
        stream.append(&chain_id);
        stream.append(&0u8);
        stream.append(&0u8);
        stream.out().to_vec()
    }

    /// Keccak hash of [`signing_payload`](Self::signing_payload)
    pub fn signing_hash(&self, chain_id: u64) -> H256 {
        keccak256(self.signing_payload(chain_id))
    }

    /// Raw signed transaction ready for `eth_sendRawTransaction`
    pub fn encode_signed(&self, chain_id: u64, signature: &Signature) -> Vec<u8> {
        let v = u64::from(signature.recovery_id) + 35 + chain_id * 2;

        let mut stream = RlpStream::new_list(9);
        self.append_fields(&mut stream);
        stream.append(&v);
        stream.append(&U256::from_big_endian(&signature.r));
        stream.append(&U256::from_big_endian(&signature.s));
        stream.out().to_vec()
    }

    fn append_fields(&self, stream: &mut RlpStream) {
        stream.append(&self.nonce);
        stream.append(&self.gas_price);
        stream.append(&self.gas_limit);
        match &self.to {
            Some(to) => stream.append(&RlpBytes(to.as_ref())),
            None => stream.append_empty_data(),
        };
        stream.append(&self.value);
        stream.append(&RlpBytes(&self.data));
    }
}

/// Byte string item
struct RlpBytes<'a>(&'a [u8]);

impl Encodable for RlpBytes<'_> {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.encoder().encode_value(self.0);
    }
}
