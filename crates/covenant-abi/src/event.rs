//! Event descriptors and log decoding

use covenant_crypto::keccak256;
use covenant_primitives::{Address, H256};
use covenant_types::Log;
use tracing::trace;

use crate::decode::decode_word;
use crate::function::canonical_signature;
use crate::{decode, AbiError, AbiType, Param, Token};

/// Contract event descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Event name
    pub name: String,
    /// Parameters in declaration order, indexed or not
    pub inputs: Vec<Param>,
    /// Anonymous events do not publish their signature as a topic
    pub anonymous: bool,
}

/// Values recovered from one matching log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEvent {
    /// Contract that emitted the log
    pub address: Address,
    /// Indexed values in declaration order. Reference types appear as
    /// [`Token::Hashed`].
    pub indexed: Vec<Token>,
    /// Non-indexed values in declaration order
    pub non_indexed: Vec<Token>,
}

impl Event {
    /// Create a non-anonymous event
    pub fn new(name: impl Into<String>, inputs: Vec<Param>) -> Self {
        Self {
            name: name.into(),
            inputs,
            anonymous: false,
        }
    }

    /// Mark the event anonymous
    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }

    /// Canonical signature, e.g. `Transfer(address,address,uint256)`
    pub fn signature(&self) -> String {
        canonical_signature(&self.name, &self.inputs)
    }

    /// Keccak hash of the signature, emitted as `topics[0]`
    pub fn topic(&self) -> H256 {
        keccak256(self.signature().as_bytes())
    }

    /// Indexed parameters
    pub fn indexed_params(&self) -> impl Iterator<Item = &Param> {
        self.inputs.iter().filter(|p| p.indexed)
    }

    /// Non-indexed parameters
    pub fn non_indexed_params(&self) -> impl Iterator<Item = &Param> {
        self.inputs.iter().filter(|p| !p.indexed)
    }

    /// Decode `log` if it was emitted by this event.
    ///
    /// Returns `Ok(None)` when the first topic differs or the topic count
    /// does not fit. A log that matches but carries malformed data is an
    /// error.
    pub fn decode_log(&self, log: &Log) -> Result<Option<DecodedEvent>, AbiError> {
        let indexed: Vec<&Param> = self.indexed_params().collect();

        let topics = if self.anonymous {
            &log.topics[..]
        } else {
            match log.topics.split_first() {
                Some((first, rest)) if *first == self.topic() => rest,
                _ => return Ok(None),
            }
        };
        if topics.len() != indexed.len() {
            trace!(
                event = %self.name,
                expected = indexed.len(),
                got = topics.len(),
                "Skipping log with mismatched topic count"
            );
            return Ok(None);
        }

        let indexed_values = indexed
            .iter()
            .zip(topics)
            .map(|(param, topic)| decode_topic(&param.kind, topic))
            .collect::<Result<Vec<_>, _>>()?;

        let data_types: Vec<AbiType> = self.non_indexed_params().map(|p| p.kind.clone()).collect();
        let non_indexed = decode(&data_types, &log.data)
            .map_err(|e| AbiError::Decoding(format!("{} data: {}", self.signature(), e)))?;

        Ok(Some(DecodedEvent {
            address: log.address,
            indexed: indexed_values,
            non_indexed,
        }))
    }

    /// Decode every log emitted by this event, in order
    pub fn filter_logs<'a>(
        &self,
        logs: impl IntoIterator<Item = &'a Log>,
    ) -> Result<Vec<DecodedEvent>, AbiError> {
        let mut events = Vec::new();
        for log in logs {
            if let Some(event) = self.decode_log(log)? {
                events.push(event);
            }
        }
        Ok(events)
    }
}

/// Value types sit in the topic as-is; reference types are only a hash
fn decode_topic(kind: &AbiType, topic: &H256) -> Result<Token, AbiError> {
    if kind.is_reference() {
        Ok(Token::Hashed(*topic))
    } else {
        decode_word(kind, topic.as_bytes())
    }
}

impl DecodedEvent {
    /// All values merged back into declaration order
    pub fn values(&self, event: &Event) -> Vec<(String, Token)> {
        let mut indexed = self.indexed.iter();
        let mut non_indexed = self.non_indexed.iter();
        event
            .inputs
            .iter()
            .filter_map(|param| {
                let token = if param.indexed {
                    indexed.next()
                } else {
                    non_indexed.next()
                };
                token.map(|t| (param.name.clone(), t.clone()))
            })
            .collect()
    }
}
