//! Function and constructor descriptors

use std::fmt;

use covenant_crypto::keccak256;
use covenant_primitives::encode_hex;

use crate::parse::{parse_type_list, split_signature};
use crate::{decode, encode, AbiError, AbiType, Token};

/// Named, typed parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Parameter name, possibly empty
    pub name: String,
    /// Parameter type
    pub kind: AbiType,
    /// Stored as a topic when part of an event
    pub indexed: bool,
}

impl Param {
    /// Create a non-indexed parameter
    pub fn new(name: impl Into<String>, kind: AbiType) -> Self {
        Self {
            name: name.into(),
            kind,
            indexed: false,
        }
    }

    /// Create an indexed event parameter
    pub fn indexed(name: impl Into<String>, kind: AbiType) -> Self {
        Self {
            name: name.into(),
            kind,
            indexed: true,
        }
    }

    /// Create an unnamed parameter
    pub fn unnamed(kind: AbiType) -> Self {
        Self::new("", kind)
    }
}

/// Whether a function reads or writes chain state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateMutability {
    /// Reads nothing from state
    Pure,
    /// Reads but never writes state
    View,
    /// Writes state, rejects value
    #[default]
    NonPayable,
    /// Writes state, accepts value
    Payable,
}

impl StateMutability {
    /// Parse the JSON ABI spelling
    pub fn from_abi_str(s: &str) -> Option<Self> {
        match s {
            "pure" => Some(StateMutability::Pure),
            "view" | "constant" => Some(StateMutability::View),
            "nonpayable" => Some(StateMutability::NonPayable),
            "payable" => Some(StateMutability::Payable),
            _ => None,
        }
    }
}

/// Compute the 4-byte selector of a canonical signature
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash.as_bytes()[..4]);
    selector
}

/// Canonical `name(type,...)` string
pub(crate) fn canonical_signature(name: &str, params: &[Param]) -> String {
    let types: Vec<String> = params.iter().map(|p| p.kind.to_string()).collect();
    format!("{}({})", name, types.join(","))
}

/// Contract function descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    /// Function name
    pub name: String,
    /// Input parameters
    pub inputs: Vec<Param>,
    /// Output parameters
    pub outputs: Vec<Param>,
    /// Declared mutability
    pub state_mutability: StateMutability,
}

impl Function {
    /// Create a non-payable function
    pub fn new(name: impl Into<String>, inputs: Vec<Param>, outputs: Vec<Param>) -> Self {
        Self {
            name: name.into(),
            inputs,
            outputs,
            state_mutability: StateMutability::NonPayable,
        }
    }

    /// Parse a human-readable signature such as `transfer(address,uint256)`.
    ///
    /// Outputs may follow as `(uint256)` or `returns (uint256)`. Parsed
    /// parameters are unnamed; a function with outputs is treated as `view`.
    pub fn parse(signature: &str) -> Result<Self, AbiError> {
        let (name, args, rest) = split_signature(signature)?;
        let inputs = parse_type_list(args)?
            .into_iter()
            .map(Param::unnamed)
            .collect();

        let rest = rest.strip_prefix("returns").map(str::trim).unwrap_or(rest);
        let outputs: Vec<Param> = if rest.is_empty() {
            Vec::new()
        } else {
            let body = rest
                .strip_prefix('(')
                .and_then(|r| r.strip_suffix(')'))
                .ok_or_else(|| AbiError::Parse(format!("invalid outputs in {:?}", signature)))?;
            parse_type_list(body)?
                .into_iter()
                .map(Param::unnamed)
                .collect()
        };

        let state_mutability = if outputs.is_empty() {
            StateMutability::NonPayable
        } else {
            StateMutability::View
        };
        Ok(Self {
            name: name.to_string(),
            inputs,
            outputs,
            state_mutability,
        })
    }

    /// Set the mutability
    pub fn with_mutability(mut self, state_mutability: StateMutability) -> Self {
        self.state_mutability = state_mutability;
        self
    }

    /// Canonical signature; parameter names do not take part
    pub fn signature(&self) -> String {
        canonical_signature(&self.name, &self.inputs)
    }

    /// First four bytes of the signature's keccak hash
    pub fn selector(&self) -> [u8; 4] {
        function_selector(&self.signature())
    }

    /// `pure` and `view` functions are answered by `eth_call`
    pub fn is_constant(&self) -> bool {
        matches!(
            self.state_mutability,
            StateMutability::Pure | StateMutability::View
        )
    }

    /// Declared input types
    pub fn input_types(&self) -> Vec<AbiType> {
        self.inputs.iter().map(|p| p.kind.clone()).collect()
    }

    /// Declared output types
    pub fn output_types(&self) -> Vec<AbiType> {
        self.outputs.iter().map(|p| p.kind.clone()).collect()
    }

    /// Selector followed by the encoded arguments
    pub fn encode_input(&self, args: &[Token]) -> Result<Vec<u8>, AbiError> {
        let mut data = self.selector().to_vec();
        let encoded = encode(&self.input_types(), args)
            .map_err(|e| AbiError::Encoding(format!("{}: {}", self.signature(), e)))?;
        data.extend(encoded);
        Ok(data)
    }

    /// [`encode_input`](Self::encode_input) as `0x`-prefixed hex
    pub fn encode_input_hex(&self, args: &[Token]) -> Result<String, AbiError> {
        Ok(encode_hex(&self.encode_input(args)?))
    }

    /// Decode call data produced by [`encode_input`](Self::encode_input)
    pub fn decode_input(&self, data: &[u8]) -> Result<Vec<Token>, AbiError> {
        if data.len() < 4 {
            return Err(AbiError::Decoding(format!(
                "call data of {} bytes has no selector",
                data.len()
            )));
        }
        let (selector, args) = data.split_at(4);
        if selector != &self.selector()[..] {
            return Err(AbiError::Decoding(format!(
                "selector {} does not match {}",
                encode_hex(selector),
                self.signature()
            )));
        }
        decode(&self.input_types(), args)
    }

    /// Decode return data
    pub fn decode_output(&self, data: &[u8]) -> Result<Vec<Token>, AbiError> {
        decode(&self.output_types(), data)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signature())
    }
}

/// Constructor descriptor
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Constructor {
    /// Constructor parameters
    pub inputs: Vec<Param>,
    /// Declared mutability
    pub state_mutability: StateMutability,
}

impl Constructor {
    /// Create a non-payable constructor
    pub fn new(inputs: Vec<Param>) -> Self {
        Self {
            inputs,
            state_mutability: StateMutability::NonPayable,
        }
    }

    /// Creation code: `bytecode` followed by the encoded arguments
    pub fn encode_input(&self, bytecode: &[u8], args: &[Token]) -> Result<Vec<u8>, AbiError> {
        let types: Vec<AbiType> = self.inputs.iter().map(|p| p.kind.clone()).collect();
        let mut data = bytecode.to_vec();
        data.extend(encode(&types, args)?);
        Ok(data)
    }
}
