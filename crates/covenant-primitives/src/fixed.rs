//! Fixed-width byte strings: `Address` (20 bytes) and `H256` (32 bytes)

use std::fmt;
use std::str::FromStr;

use crate::PrimitiveError;

macro_rules! fixed_bytes {
    ($(#[$meta:meta])* $name:ident, $len:expr, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name([u8; $len]);

        impl $name {
            /// Size in bytes
            pub const LEN: usize = $len;

            /// All-zero value
            pub const ZERO: $name = $name([0u8; $len]);

            /// Wrap raw bytes
            pub const fn from_bytes(bytes: [u8; $len]) -> Self {
                $name(bytes)
            }

            /// Copy from a slice of exactly `LEN` bytes
            pub fn from_slice(slice: &[u8]) -> Result<Self, PrimitiveError> {
                let bytes: [u8; $len] =
                    slice.try_into().map_err(|_| PrimitiveError::InvalidLength {
                        kind: $kind,
                        expected: $len,
                        got: slice.len(),
                    })?;
                Ok($name(bytes))
            }

            /// Parse from a hex string, with or without `0x`
            pub fn from_hex(s: &str) -> Result<Self, PrimitiveError> {
                Self::from_slice(&crate::decode_hex(s)?)
            }

            /// Borrow the raw bytes
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// True when every byte is zero
            pub fn is_zero(&self) -> bool {
                self.0 == [0u8; $len]
            }

            /// Lower-case `0x`-prefixed hex
            pub fn to_hex(&self) -> String {
                crate::encode_hex(&self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl FromStr for $name {
            type Err = PrimitiveError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex(s)
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                $name(bytes)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }
    };
}

fixed_bytes!(
    /// Ethereum-compatible 20-byte account address
    Address,
    20,
    "address"
);

fixed_bytes!(
    /// 32-byte hash (transaction hashes, log topics, keccak digests)
    H256,
    32,
    "hash"
);

impl Address {
    /// Take the low 20 bytes of a 32-byte ABI word
    pub fn from_word(word: &[u8; 32]) -> Self {
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&word[12..]);
        Address(bytes)
    }

    /// Left-pad to a 32-byte ABI word
    pub fn to_word(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(&self.0);
        word
    }
}

impl H256 {
    /// Interpret the hash as a big-endian integer
    pub fn to_u256(&self) -> crate::U256 {
        crate::U256::from_big_endian(&self.0)
    }
}
