//! # covenant-abi
//!
//! Solidity contract ABI: the type system, head/tail encoding and decoding,
//! function and event descriptors, and loading of solc JSON ABI documents.
//!
//! # Example
//!
//! ```rust
//! use covenant_abi::{decode, AbiType, Function, Token};
//! use covenant_primitives::{Address, U256};
//!
//! // Encode a transfer call
//! let transfer = Function::parse("transfer(address,uint256)").unwrap();
//! let data = transfer
//!     .encode_input(&[Token::Address(Address::ZERO), Token::Uint(U256::from(1000))])
//!     .unwrap();
//! assert_eq!(&data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
//!
//! // Decode a balance response
//! let return_data = [0u8; 32]; // From eth_call
//! let balance = decode(&[AbiType::Uint(256)], &return_data).unwrap();
//! assert_eq!(balance, vec![Token::Uint(U256::zero())]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod decode;
mod encode;
mod error;
mod event;
mod function;
mod json;
mod parse;
mod token;
mod types;

pub use decode::{decode, decode_hex_data, decode_word};
pub use encode::{encode, encode_deploy_data, encode_function_call};
pub use error::AbiError;
pub use event::{DecodedEvent, Event};
pub use function::{function_selector, Constructor, Function, Param, StateMutability};
pub use json::Abi;
pub use parse::parse_type_list;
pub use token::{FromToken, Token};
pub use types::{AbiType, I256, MAX_FIXED_DECIMALS};
