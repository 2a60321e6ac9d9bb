//! Keccak-256 hashing

use covenant_primitives::H256;
use sha3::{Digest, Keccak256};

/// Compute the Keccak-256 digest of `data`
pub fn keccak256(data: impl AsRef<[u8]>) -> H256 {
    let digest: [u8; 32] = Keccak256::digest(data.as_ref()).into();
    H256::from_bytes(digest)
}
