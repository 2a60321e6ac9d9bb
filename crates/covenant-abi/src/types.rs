//! ABI type definitions

use std::fmt;

use covenant_primitives::U256;

use crate::AbiError;

/// Largest decimal offset a fixed-point type may declare
pub const MAX_FIXED_DECIMALS: usize = 80;

/// Solidity parameter types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AbiType {
    /// Unsigned integer with bit size (8, 16, ..., 256)
    Uint(usize),
    /// Signed integer with bit size
    Int(usize),
    /// Boolean
    Bool,
    /// Address
    Address,
    /// Signed fixed-point number: (bits, decimals)
    Fixed(usize, usize),
    /// Unsigned fixed-point number: (bits, decimals)
    UFixed(usize, usize),
    /// Fixed-size bytes (size 1-32)
    FixedBytes(usize),
    /// Dynamic bytes
    Bytes,
    /// UTF-8 string
    String,
    /// Dynamic array
    Array(Box<AbiType>),
    /// Fixed-size array
    FixedArray(Box<AbiType>, usize),
    /// Tuple
    Tuple(Vec<AbiType>),
}

impl AbiType {
    /// `uintN`, validating the width
    pub fn uint(bits: usize) -> Result<Self, AbiError> {
        check_bits("uint", bits)?;
        Ok(AbiType::Uint(bits))
    }

    /// `intN`, validating the width
    pub fn int(bits: usize) -> Result<Self, AbiError> {
        check_bits("int", bits)?;
        Ok(AbiType::Int(bits))
    }

    /// `fixedMxN`, validating both parameters
    pub fn fixed(bits: usize, decimals: usize) -> Result<Self, AbiError> {
        check_fixed("fixed", bits, decimals)?;
        Ok(AbiType::Fixed(bits, decimals))
    }

    /// `ufixedMxN`, validating both parameters
    pub fn ufixed(bits: usize, decimals: usize) -> Result<Self, AbiError> {
        check_fixed("ufixed", bits, decimals)?;
        Ok(AbiType::UFixed(bits, decimals))
    }

    /// `bytesN`, validating the size
    pub fn fixed_bytes(size: usize) -> Result<Self, AbiError> {
        if !(1..=32).contains(&size) {
            return Err(AbiError::InvalidType(format!("bytes{}", size)));
        }
        Ok(AbiType::FixedBytes(size))
    }

    /// Check every width, size and decimal offset, recursively
    pub fn validate(&self) -> Result<(), AbiError> {
        match self {
            AbiType::Uint(bits) => check_bits("uint", *bits),
            AbiType::Int(bits) => check_bits("int", *bits),
            AbiType::Fixed(bits, decimals) => check_fixed("fixed", *bits, *decimals),
            AbiType::UFixed(bits, decimals) => check_fixed("ufixed", *bits, *decimals),
            AbiType::FixedBytes(size) => Self::fixed_bytes(*size).map(|_| ()),
            AbiType::Array(inner) | AbiType::FixedArray(inner, _) => inner.validate(),
            AbiType::Tuple(types) => types.iter().try_for_each(|t| t.validate()),
            AbiType::Bool | AbiType::Address | AbiType::Bytes | AbiType::String => Ok(()),
        }
    }

    /// Check if this type is dynamic (variable length)
    pub fn is_dynamic(&self) -> bool {
        match self {
            AbiType::Bytes | AbiType::String | AbiType::Array(_) => true,
            AbiType::FixedArray(inner, _) => inner.is_dynamic(),
            AbiType::Tuple(types) => types.iter().any(|t| t.is_dynamic()),
            _ => false,
        }
    }

    /// Number of 32-byte words this type occupies in the head of a tuple.
    ///
    /// Dynamic types take a single offset word; static composites are laid
    /// out inline.
    pub fn head_words(&self) -> usize {
        if self.is_dynamic() {
            return 1;
        }
        match self {
            AbiType::FixedArray(inner, len) => inner.head_words() * len,
            AbiType::Tuple(types) => types.iter().map(|t| t.head_words()).sum(),
            _ => 1,
        }
    }

    /// Arrays, tuples, `bytes` and `string` are hashed when indexed in an event
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            AbiType::Bytes
                | AbiType::String
                | AbiType::Array(_)
                | AbiType::FixedArray(..)
                | AbiType::Tuple(_)
        )
    }
}

impl fmt::Display for AbiType {
    /// Canonical name as used in signatures
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiType::Uint(bits) => write!(f, "uint{}", bits),
            AbiType::Int(bits) => write!(f, "int{}", bits),
            AbiType::Bool => f.write_str("bool"),
            AbiType::Address => f.write_str("address"),
            AbiType::Fixed(bits, decimals) => write!(f, "fixed{}x{}", bits, decimals),
            AbiType::UFixed(bits, decimals) => write!(f, "ufixed{}x{}", bits, decimals),
            AbiType::FixedBytes(size) => write!(f, "bytes{}", size),
            AbiType::Bytes => f.write_str("bytes"),
            AbiType::String => f.write_str("string"),
            AbiType::Array(inner) => write!(f, "{}[]", inner),
            AbiType::FixedArray(inner, len) => write!(f, "{}[{}]", inner, len),
            AbiType::Tuple(types) => {
                f.write_str("(")?;
                for (i, t) in types.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", t)?;
                }
                f.write_str(")")
            }
        }
    }
}

fn check_bits(kind: &str, bits: usize) -> Result<(), AbiError> {
    if bits == 0 || bits > 256 || bits % 8 != 0 {
        return Err(AbiError::InvalidType(format!("{}{}", kind, bits)));
    }
    Ok(())
}

fn check_fixed(kind: &str, bits: usize, decimals: usize) -> Result<(), AbiError> {
    if bits == 0 || bits > 256 || bits % 8 != 0 || decimals > MAX_FIXED_DECIMALS {
        return Err(AbiError::InvalidType(format!(
            "{}{}x{}",
            kind, bits, decimals
        )));
    }
    Ok(())
}

/// Signed 256-bit integer stored in two's complement
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct I256(U256);

impl I256 {
    /// Zero
    pub const ZERO: I256 = I256(U256::zero());

    /// Wrap a raw two's-complement word
    pub const fn from_raw(raw: U256) -> Self {
        I256(raw)
    }

    /// Raw two's-complement word
    pub fn into_raw(self) -> U256 {
        self.0
    }

    /// Build from a sign and magnitude
    pub fn from_sign_abs(negative: bool, abs: U256) -> Self {
        if negative && !abs.is_zero() {
            I256(twos_complement(abs))
        } else {
            I256(abs)
        }
    }

    /// Create from i128
    pub fn from_i128(value: i128) -> Self {
        Self::from_sign_abs(value < 0, U256::from(value.unsigned_abs()))
    }

    /// Check the sign bit
    pub fn is_negative(&self) -> bool {
        self.0.bit(255)
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Magnitude; `2^255` for the minimum value
    pub fn unsigned_abs(&self) -> U256 {
        if self.is_negative() {
            twos_complement(self.0)
        } else {
            self.0
        }
    }

    /// Convert to i128 if it fits
    pub fn to_i128(&self) -> Option<i128> {
        let abs = self.unsigned_abs();
        if abs.bits() > 128 {
            return None;
        }
        let abs = abs.as_u128();
        if self.is_negative() {
            0i128.checked_sub_unsigned(abs)
        } else {
            i128::try_from(abs).ok()
        }
    }

    /// True when the value lies in the range of `intN`
    pub fn fits_bits(&self, bits: usize) -> bool {
        if bits >= 256 {
            return true;
        }
        let limit = U256::one() << (bits - 1);
        if self.is_negative() {
            self.unsigned_abs() <= limit
        } else {
            self.0 < limit
        }
    }

    /// Parse a decimal string with an optional leading `-`
    pub fn from_dec_str(s: &str) -> Result<Self, AbiError> {
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let abs = U256::from_dec_str(digits)
            .map_err(|e| AbiError::Parse(format!("invalid integer {:?}: {:?}", s, e)))?;
        let limit = U256::one() << 255;
        if (negative && abs > limit) || (!negative && abs >= limit) {
            return Err(AbiError::Parse(format!("integer {} out of int256 range", s)));
        }
        Ok(Self::from_sign_abs(negative, abs))
    }
}

fn twos_complement(value: U256) -> U256 {
    (!value).overflowing_add(U256::one()).0
}

impl From<i64> for I256 {
    fn from(value: i64) -> Self {
        Self::from_i128(value.into())
    }
}

impl From<i128> for I256 {
    fn from(value: i128) -> Self {
        Self::from_i128(value)
    }
}

impl fmt::Display for I256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            write!(f, "-{}", self.unsigned_abs())
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl fmt::Debug for I256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "I256({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_validation() {
        assert!(AbiType::uint(8).is_ok());
        assert!(AbiType::uint(256).is_ok());
        assert!(AbiType::uint(0).is_err());
        assert!(AbiType::uint(7).is_err());
        assert!(AbiType::int(264).is_err());
        assert!(AbiType::fixed_bytes(0).is_err());
        assert!(AbiType::fixed_bytes(33).is_err());
        assert!(AbiType::ufixed(128, 18).is_ok());
        assert!(AbiType::fixed(128, 81).is_err());
        assert!(AbiType::fixed(12, 10).is_err());

        let nested = AbiType::Array(Box::new(AbiType::Tuple(vec![AbiType::Uint(9)])));
        assert!(nested.validate().is_err());
    }

    #[test]
    fn test_is_dynamic() {
        assert!(!AbiType::Uint(256).is_dynamic());
        assert!(AbiType::Bytes.is_dynamic());
        assert!(AbiType::Array(Box::new(AbiType::Bool)).is_dynamic());
        assert!(!AbiType::FixedArray(Box::new(AbiType::Bool), 3).is_dynamic());
        assert!(AbiType::FixedArray(Box::new(AbiType::String), 3).is_dynamic());
        assert!(AbiType::Tuple(vec![AbiType::Address, AbiType::Bytes]).is_dynamic());
    }

    #[test]
    fn test_head_words() {
        let pair = AbiType::Tuple(vec![AbiType::Uint(256), AbiType::Address]);
        assert_eq!(pair.head_words(), 2);
        assert_eq!(AbiType::FixedArray(Box::new(pair), 3).head_words(), 6);
        assert_eq!(AbiType::FixedArray(Box::new(AbiType::String), 3).head_words(), 1);
    }

    #[test]
    fn test_canonical_names() {
        let ty = AbiType::Array(Box::new(AbiType::Tuple(vec![
            AbiType::Uint(256),
            AbiType::FixedArray(Box::new(AbiType::FixedBytes(32)), 2),
            AbiType::UFixed(128, 18),
        ])));
        assert_eq!(ty.to_string(), "(uint256,bytes32[2],ufixed128x18)[]");
    }

    #[test]
    fn test_i256_twos_complement() {
        let minus_one = I256::from_i128(-1);
        assert_eq!(minus_one.into_raw(), U256::MAX);
        assert!(minus_one.is_negative());
        assert_eq!(minus_one.unsigned_abs(), U256::one());
        assert_eq!(minus_one.to_i128(), Some(-1));
        assert_eq!(I256::from_i128(i128::MIN).to_i128(), Some(i128::MIN));
        assert_eq!(I256::from_i128(42).to_string(), "42");
        assert_eq!(I256::from_i128(-42).to_string(), "-42");
    }

    #[test]
    fn test_i256_fits_bits() {
        assert!(I256::from_i128(127).fits_bits(8));
        assert!(!I256::from_i128(128).fits_bits(8));
        assert!(I256::from_i128(-128).fits_bits(8));
        assert!(!I256::from_i128(-129).fits_bits(8));
        assert!(I256::from_raw(U256::MAX).fits_bits(8));
    }

    #[test]
    fn test_i256_from_dec_str() {
        assert_eq!(I256::from_dec_str("-5").unwrap(), I256::from_i128(-5));
        assert_eq!(I256::from_dec_str("17").unwrap(), I256::from_i128(17));
        assert!(I256::from_dec_str("abc").is_err());
        let min = format!("-{}", U256::one() << 255);
        assert!(I256::from_dec_str(&min).unwrap().is_negative());
        let over = (U256::one() << 255).to_string();
        assert!(I256::from_dec_str(&over).is_err());
    }
}
