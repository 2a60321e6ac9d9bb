//! # covenant-crypto
//!
//! - Keccak-256 hashing (selectors, event topics, transaction hashes)
//! - Recoverable secp256k1 signing of 32-byte prehashes
//! - Address derivation and recovery

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod hash;
mod signature;

pub use error::CryptoError;
pub use hash::keccak256;
pub use signature::{
    public_key_to_address, recover_address, sign, PrivateKey, PublicKey, Signature,
};
