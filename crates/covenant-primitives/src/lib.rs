//! # covenant-primitives
//!
//! Fixed-width byte types and 256-bit integers shared by every covenant crate.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod fixed;

pub use error::PrimitiveError;
pub use fixed::{Address, H256};

// Re-export primitive-types for U256
pub use primitive_types::U256;

/// Size of one ABI word in bytes
pub const WORD_SIZE: usize = 32;

/// Parse a `0x`-prefixed (or bare) hex string into bytes.
///
/// An empty string and a lone `0x` both decode to an empty vector.
pub fn decode_hex(s: &str) -> Result<Vec<u8>, PrimitiveError> {
    let s = s.trim();
    let s = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    hex::decode(s).map_err(|e| PrimitiveError::InvalidHex(e.to_string()))
}

/// Encode bytes as a lower-case `0x`-prefixed hex string
pub fn encode_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Convert a U256 to its 32-byte big-endian representation
pub fn u256_to_word(value: &U256) -> [u8; 32] {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    word
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_hex_prefixes() {
        assert_eq!(decode_hex("0x0102").unwrap(), vec![1, 2]);
        assert_eq!(decode_hex("0X0102").unwrap(), vec![1, 2]);
        assert_eq!(decode_hex("0102").unwrap(), vec![1, 2]);
        assert!(decode_hex("0x").unwrap().is_empty());
        assert!(decode_hex("").unwrap().is_empty());
    }

    #[test]
    fn test_decode_hex_rejects_odd_length() {
        assert!(decode_hex("0x123").is_err());
    }

    #[test]
    fn test_u256_to_word() {
        let word = u256_to_word(&U256::from(0x1234u64));
        assert_eq!(&word[..30], &[0u8; 30]);
        assert_eq!(&word[30..], &[0x12, 0x34]);
        assert_eq!(encode_hex(&word[30..]), "0x1234");
    }
}
