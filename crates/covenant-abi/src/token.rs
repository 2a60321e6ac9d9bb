//! ABI values

use std::fmt;

use covenant_primitives::{encode_hex, Address, H256, U256};

use crate::{AbiError, AbiType, I256};

/// Solidity ABI token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Address (20 bytes)
    Address(Address),
    /// Unsigned integer (8-256 bits)
    Uint(U256),
    /// Signed integer (8-256 bits)
    Int(I256),
    /// Boolean
    Bool(bool),
    /// Signed fixed-point value as its scaled integer magnitude
    Fixed(I256),
    /// Unsigned fixed-point value as its scaled integer magnitude
    UFixed(U256),
    /// Fixed-size bytes (1-32)
    FixedBytes(Vec<u8>),
    /// Dynamic bytes
    Bytes(Vec<u8>),
    /// UTF-8 string
    String(String),
    /// Dynamic array
    Array(Vec<Token>),
    /// Fixed-size array
    FixedArray(Vec<Token>),
    /// Tuple (struct)
    Tuple(Vec<Token>),
    /// Keccak hash standing in for an indexed reference-type event argument.
    ///
    /// Only produced by log decoding; it cannot be encoded.
    Hashed(H256),
}

impl Token {
    /// Create a uint token
    pub fn uint(value: impl Into<U256>) -> Self {
        Token::Uint(value.into())
    }

    /// Create an int token from i128
    pub fn int(value: i128) -> Self {
        Token::Int(I256::from_i128(value))
    }

    /// Create a string token
    pub fn string(s: impl Into<String>) -> Self {
        Token::String(s.into())
    }

    /// Create a bytes32 token
    pub fn bytes32(data: H256) -> Self {
        Token::FixedBytes(data.as_bytes().to_vec())
    }

    /// Short name of the variant, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Token::Address(_) => "address",
            Token::Uint(_) => "uint",
            Token::Int(_) => "int",
            Token::Bool(_) => "bool",
            Token::Fixed(_) => "fixed",
            Token::UFixed(_) => "ufixed",
            Token::FixedBytes(_) => "fixed bytes",
            Token::Bytes(_) => "bytes",
            Token::String(_) => "string",
            Token::Array(_) => "array",
            Token::FixedArray(_) => "fixed array",
            Token::Tuple(_) => "tuple",
            Token::Hashed(_) => "hashed topic",
        }
    }

    /// Check that this value can be encoded as `ty`
    pub fn type_check(&self, ty: &AbiType) -> Result<(), AbiError> {
        match (ty, self) {
            (AbiType::Uint(bits), Token::Uint(v)) | (AbiType::UFixed(bits, _), Token::UFixed(v)) => {
                if v.bits() > *bits {
                    return Err(out_of_range(ty, v));
                }
            }
            (AbiType::Int(bits), Token::Int(v)) | (AbiType::Fixed(bits, _), Token::Fixed(v)) => {
                if !v.fits_bits(*bits) {
                    return Err(out_of_range(ty, v));
                }
            }
            (AbiType::Bool, Token::Bool(_))
            | (AbiType::Address, Token::Address(_))
            | (AbiType::Bytes, Token::Bytes(_))
            | (AbiType::String, Token::String(_)) => {}
            (AbiType::FixedBytes(size), Token::FixedBytes(bytes)) => {
                if bytes.len() != *size {
                    return Err(AbiError::Encoding(format!(
                        "{} expects {} bytes, got {}",
                        ty,
                        size,
                        bytes.len()
                    )));
                }
            }
            (AbiType::Array(inner), Token::Array(items)) => {
                for item in items {
                    item.type_check(inner)?;
                }
            }
            (AbiType::FixedArray(inner, len), Token::FixedArray(items)) => {
                if items.len() != *len {
                    return Err(AbiError::Encoding(format!(
                        "{} expects {} elements, got {}",
                        ty,
                        len,
                        items.len()
                    )));
                }
                for item in items {
                    item.type_check(inner)?;
                }
            }
            (AbiType::Tuple(types), Token::Tuple(items)) => {
                if items.len() != types.len() {
                    return Err(AbiError::Encoding(format!(
                        "{} expects {} components, got {}",
                        ty,
                        types.len(),
                        items.len()
                    )));
                }
                for (item, t) in items.iter().zip(types) {
                    item.type_check(t)?;
                }
            }
            _ => {
                return Err(AbiError::Encoding(format!(
                    "expected {}, got {} value",
                    ty,
                    self.kind()
                )))
            }
        }
        Ok(())
    }
}

fn out_of_range(ty: &AbiType, value: &dyn fmt::Display) -> AbiError {
    AbiError::Encoding(format!("value {} out of range for {}", value, ty))
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Address(a) => write!(f, "{}", a),
            Token::Uint(v) | Token::UFixed(v) => write!(f, "{}", v),
            Token::Int(v) | Token::Fixed(v) => write!(f, "{}", v),
            Token::Bool(b) => write!(f, "{}", b),
            Token::FixedBytes(b) | Token::Bytes(b) => f.write_str(&encode_hex(b)),
            Token::String(s) => write!(f, "{:?}", s),
            Token::Hashed(h) => write!(f, "{}", h),
            Token::Array(items) | Token::FixedArray(items) => {
                f.write_str("[")?;
                write_list(f, items)?;
                f.write_str("]")
            }
            Token::Tuple(items) => {
                f.write_str("(")?;
                write_list(f, items)?;
                f.write_str(")")
            }
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Token]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// Conversion from a decoded token into a native value
pub trait FromToken: Sized {
    /// Convert, failing when the token holds a different kind of value
    fn from_token(token: Token) -> Result<Self, AbiError>;
}

fn unexpected(expected: &str, token: &Token) -> AbiError {
    AbiError::Decoding(format!("expected {}, found {}", expected, token.kind()))
}

impl FromToken for Token {
    fn from_token(token: Token) -> Result<Self, AbiError> {
        Ok(token)
    }
}

impl FromToken for U256 {
    fn from_token(token: Token) -> Result<Self, AbiError> {
        match token {
            Token::Uint(v) => Ok(v),
            other => Err(unexpected("uint", &other)),
        }
    }
}

impl FromToken for u64 {
    fn from_token(token: Token) -> Result<Self, AbiError> {
        let value = U256::from_token(token)?;
        if value.bits() > 64 {
            return Err(AbiError::Decoding(format!("{} does not fit in u64", value)));
        }
        Ok(value.as_u64())
    }
}

impl FromToken for u128 {
    fn from_token(token: Token) -> Result<Self, AbiError> {
        let value = U256::from_token(token)?;
        if value.bits() > 128 {
            return Err(AbiError::Decoding(format!("{} does not fit in u128", value)));
        }
        Ok(value.as_u128())
    }
}

impl FromToken for I256 {
    fn from_token(token: Token) -> Result<Self, AbiError> {
        match token {
            Token::Int(v) => Ok(v),
            other => Err(unexpected("int", &other)),
        }
    }
}

impl FromToken for bool {
    fn from_token(token: Token) -> Result<Self, AbiError> {
        match token {
            Token::Bool(b) => Ok(b),
            other => Err(unexpected("bool", &other)),
        }
    }
}

impl FromToken for Address {
    fn from_token(token: Token) -> Result<Self, AbiError> {
        match token {
            Token::Address(a) => Ok(a),
            other => Err(unexpected("address", &other)),
        }
    }
}

impl FromToken for String {
    fn from_token(token: Token) -> Result<Self, AbiError> {
        match token {
            Token::String(s) => Ok(s),
            other => Err(unexpected("string", &other)),
        }
    }
}

impl FromToken for Vec<u8> {
    fn from_token(token: Token) -> Result<Self, AbiError> {
        match token {
            Token::Bytes(b) | Token::FixedBytes(b) => Ok(b),
            other => Err(unexpected("bytes", &other)),
        }
    }
}

impl FromToken for H256 {
    fn from_token(token: Token) -> Result<Self, AbiError> {
        match token {
            Token::Hashed(h) => Ok(h),
            Token::FixedBytes(b) if b.len() == 32 => {
                H256::from_slice(&b).map_err(|e| AbiError::Decoding(e.to_string()))
            }
            other => Err(unexpected("bytes32", &other)),
        }
    }
}

impl FromToken for Vec<Token> {
    fn from_token(token: Token) -> Result<Self, AbiError> {
        match token {
            Token::Array(items) | Token::FixedArray(items) | Token::Tuple(items) => Ok(items),
            other => Err(unexpected("array or tuple", &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_check_ranges() {
        assert!(Token::uint(255u64).type_check(&AbiType::Uint(8)).is_ok());
        assert!(Token::uint(256u64).type_check(&AbiType::Uint(8)).is_err());
        assert!(Token::int(-128).type_check(&AbiType::Int(8)).is_ok());
        assert!(Token::int(128).type_check(&AbiType::Int(8)).is_err());
        assert!(Token::Fixed(I256::from_i128(-1)).type_check(&AbiType::Fixed(8, 1)).is_ok());
    }

    #[test]
    fn test_type_check_shapes() {
        let bytes4 = AbiType::FixedBytes(4);
        assert!(Token::FixedBytes(vec![0; 4]).type_check(&bytes4).is_ok());
        assert!(Token::FixedBytes(vec![0; 5]).type_check(&bytes4).is_err());

        let pair = AbiType::FixedArray(Box::new(AbiType::Bool), 2);
        assert!(Token::FixedArray(vec![Token::Bool(true)]).type_check(&pair).is_err());

        let tuple = AbiType::Tuple(vec![AbiType::Bool, AbiType::String]);
        let ok = Token::Tuple(vec![Token::Bool(false), Token::string("x")]);
        assert!(ok.type_check(&tuple).is_ok());
        let swapped = Token::Tuple(vec![Token::string("x"), Token::Bool(false)]);
        assert!(swapped.type_check(&tuple).is_err());
    }

    #[test]
    fn test_hashed_cannot_be_encoded() {
        let err = Token::Hashed(H256::ZERO).type_check(&AbiType::String).unwrap_err();
        assert!(matches!(err, AbiError::Encoding(_)));
    }

    #[test]
    fn test_from_token() {
        assert_eq!(u64::from_token(Token::uint(7u64)).unwrap(), 7);
        assert!(u64::from_token(Token::Uint(U256::MAX)).is_err());
        assert!(bool::from_token(Token::uint(1u64)).is_err());
        assert_eq!(
            String::from_token(Token::string("hi")).unwrap(),
            "hi".to_string()
        );
        let h = H256::from_bytes([9u8; 32]);
        assert_eq!(H256::from_token(Token::bytes32(h)).unwrap(), h);
        assert_eq!(H256::from_token(Token::Hashed(h)).unwrap(), h);
    }

    #[test]
    fn test_display() {
        let token = Token::Tuple(vec![
            Token::int(-3),
            Token::Array(vec![Token::Bool(true), Token::Bool(false)]),
            Token::Bytes(vec![0xde, 0xad]),
            Token::string("a"),
        ]);
        assert_eq!(token.to_string(), "(-3, [true, false], 0xdead, \"a\")");
    }
}
