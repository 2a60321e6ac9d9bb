//! ABI encoding

use covenant_primitives::{decode_hex, u256_to_word, U256, WORD_SIZE};

use crate::{AbiError, AbiType, Token};

/// Encode `tokens` as a tuple of `types`.
///
/// Every value is checked against its declared type before any byte is
/// produced, so a mismatch never yields a partial encoding.
pub fn encode(types: &[AbiType], tokens: &[Token]) -> Result<Vec<u8>, AbiError> {
    if types.len() != tokens.len() {
        return Err(AbiError::Encoding(format!(
            "expected {} values, got {}",
            types.len(),
            tokens.len()
        )));
    }
    for (i, (ty, token)) in types.iter().zip(tokens).enumerate() {
        ty.validate()?;
        token
            .type_check(ty)
            .map_err(|e| AbiError::Encoding(format!("argument {}: {}", i, detail(e))))?;
    }

    let types: Vec<&AbiType> = types.iter().collect();
    encode_params(&types, tokens)
}

/// Encode function call (selector + params)
pub fn encode_function_call(
    selector: [u8; 4],
    types: &[AbiType],
    tokens: &[Token],
) -> Result<Vec<u8>, AbiError> {
    let mut result = selector.to_vec();
    result.extend(encode(types, tokens)?);
    Ok(result)
}

/// Append encoded constructor arguments to contract bytecode given as hex
pub fn encode_deploy_data(
    bytecode: &str,
    types: &[AbiType],
    tokens: &[Token],
) -> Result<Vec<u8>, AbiError> {
    let mut result =
        decode_hex(bytecode).map_err(|e| AbiError::Encoding(format!("bytecode: {}", e)))?;
    result.extend(encode(types, tokens)?);
    Ok(result)
}

fn detail(e: AbiError) -> String {
    match e {
        AbiError::Encoding(msg) | AbiError::InvalidType(msg) => msg,
        other => other.to_string(),
    }
}

/// Head/tail encoding of a tuple. Offsets are relative to the start of the
/// tuple's own head.
fn encode_params(types: &[&AbiType], tokens: &[Token]) -> Result<Vec<u8>, AbiError> {
    let head_size = types.iter().map(|t| t.head_words() * WORD_SIZE).sum::<usize>();

    let mut head = Vec::with_capacity(head_size);
    let mut tail = Vec::new();

    for (param_type, token) in types.iter().zip(tokens) {
        if param_type.is_dynamic() {
            let offset = head_size + tail.len();
            head.extend_from_slice(&u256_to_word(&U256::from(offset)));
            tail.extend(encode_dynamic(param_type, token)?);
        } else {
            encode_static(param_type, token, &mut head)?;
        }
    }

    head.extend(tail);
    Ok(head)
}

/// Write a static value in place
fn encode_static(param_type: &AbiType, token: &Token, out: &mut Vec<u8>) -> Result<(), AbiError> {
    match (param_type, token) {
        (AbiType::Address, Token::Address(addr)) => out.extend_from_slice(&addr.to_word()),
        (AbiType::Uint(_), Token::Uint(value)) | (AbiType::UFixed(..), Token::UFixed(value)) => {
            out.extend_from_slice(&u256_to_word(value))
        }
        (AbiType::Int(_), Token::Int(value)) | (AbiType::Fixed(..), Token::Fixed(value)) => {
            out.extend_from_slice(&u256_to_word(&value.into_raw()))
        }
        (AbiType::Bool, Token::Bool(b)) => {
            let mut word = [0u8; 32];
            word[31] = u8::from(*b);
            out.extend_from_slice(&word);
        }
        (AbiType::FixedBytes(_), Token::FixedBytes(data)) => {
            let mut word = [0u8; 32];
            word[..data.len()].copy_from_slice(data);
            out.extend_from_slice(&word);
        }
        (AbiType::FixedArray(inner, _), Token::FixedArray(tokens)) => {
            for token in tokens {
                encode_static(inner, token, out)?;
            }
        }
        (AbiType::Tuple(types), Token::Tuple(tokens)) => {
            for (ty, token) in types.iter().zip(tokens) {
                encode_static(ty, token, out)?;
            }
        }
        _ => return Err(mismatch(param_type, token)),
    }
    Ok(())
}

/// Encode the tail segment of a dynamic value
fn encode_dynamic(param_type: &AbiType, token: &Token) -> Result<Vec<u8>, AbiError> {
    match (param_type, token) {
        (AbiType::Bytes, Token::Bytes(data)) => Ok(encode_bytes(data)),
        (AbiType::String, Token::String(s)) => Ok(encode_bytes(s.as_bytes())),
        (AbiType::Array(inner), Token::Array(tokens)) => {
            let mut result = u256_to_word(&U256::from(tokens.len())).to_vec();
            let inner_types = vec![inner.as_ref(); tokens.len()];
            result.extend(encode_params(&inner_types, tokens)?);
            Ok(result)
        }
        (AbiType::FixedArray(inner, _), Token::FixedArray(tokens)) => {
            let inner_types = vec![inner.as_ref(); tokens.len()];
            encode_params(&inner_types, tokens)
        }
        (AbiType::Tuple(types), Token::Tuple(tokens)) => {
            let types: Vec<&AbiType> = types.iter().collect();
            encode_params(&types, tokens)
        }
        _ => Err(mismatch(param_type, token)),
    }
}

fn mismatch(param_type: &AbiType, token: &Token) -> AbiError {
    AbiError::Encoding(format!("expected {}, got {} value", param_type, token.kind()))
}

/// Length word followed by the data, right-padded to a word boundary
fn encode_bytes(data: &[u8]) -> Vec<u8> {
    let padded_len = data.len().div_ceil(WORD_SIZE) * WORD_SIZE;
    let mut result = Vec::with_capacity(WORD_SIZE + padded_len);
    result.extend_from_slice(&u256_to_word(&U256::from(data.len())));
    result.extend_from_slice(data);
    result.resize(WORD_SIZE + padded_len, 0);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::I256;
    use covenant_primitives::Address;

    fn hex_of(bytes: &[u8]) -> String {
        hex::encode(bytes)
    }

    #[test]
    fn test_encode_uint() {
        let encoded = encode(&[AbiType::Uint(256)], &[Token::uint(42u64)]).unwrap();
        assert_eq!(encoded.len(), 32);
        assert_eq!(encoded[31], 42);
    }

    #[test]
    fn test_encode_negative_int() {
        let encoded = encode(&[AbiType::Int(256)], &[Token::int(-1)]).unwrap();
        assert_eq!(encoded, vec![0xff; 32]);

        let encoded = encode(&[AbiType::Int(8)], &[Token::Int(I256::from_i128(-2))]).unwrap();
        assert_eq!(encoded[..31], [0xff; 31]);
        assert_eq!(encoded[31], 0xfe);
    }

    #[test]
    fn test_encode_address() {
        let addr = Address::from_bytes([0x11; 20]);
        let encoded = encode(&[AbiType::Address], &[Token::Address(addr)]).unwrap();
        assert_eq!(&encoded[..12], &[0u8; 12]);
        assert_eq!(&encoded[12..], &[0x11; 20]);
    }

    #[test]
    fn test_encode_fixed_bytes_right_aligned_padding() {
        let encoded = encode(&[AbiType::FixedBytes(2)], &[Token::FixedBytes(vec![0xab, 0xcd])])
            .unwrap();
        assert_eq!(&encoded[..2], &[0xab, 0xcd]);
        assert_eq!(&encoded[2..], &[0u8; 30]);
    }

    #[test]
    fn test_encode_string() {
        let encoded = encode(&[AbiType::String], &[Token::string("hello")]).unwrap();
        assert_eq!(encoded.len(), 96);
        assert_eq!(encoded[31], 0x20);
        assert_eq!(encoded[63], 5);
        assert_eq!(&encoded[64..69], b"hello");
        assert_eq!(&encoded[69..], &[0u8; 27]);
    }

    #[test]
    fn test_encode_empty_bytes() {
        let encoded = encode(&[AbiType::Bytes], &[Token::Bytes(vec![])]).unwrap();
        assert_eq!(encoded.len(), 64);
        assert_eq!(encoded[31], 0x20);
        assert!(encoded[32..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_encode_dynamic_uint_array() {
        // bar(uint256[]) with [1, 2, 3]
        let ty = AbiType::Array(Box::new(AbiType::Uint(256)));
        let tokens = [Token::Array(vec![
            Token::uint(1u64),
            Token::uint(2u64),
            Token::uint(3u64),
        ])];
        let encoded = encode(&[ty], &tokens).unwrap();
        assert_eq!(
            hex_of(&encoded),
            concat!(
                "0000000000000000000000000000000000000000000000000000000000000020",
                "0000000000000000000000000000000000000000000000000000000000000003",
                "0000000000000000000000000000000000000000000000000000000000000001",
                "0000000000000000000000000000000000000000000000000000000000000002",
                "0000000000000000000000000000000000000000000000000000000000000003",
            )
        );
    }

    #[test]
    fn test_encode_nested_dynamic_offsets() {
        // f(uint256, string[], bool): nested offsets are relative to the inner tuple
        let types = [
            AbiType::Uint(256),
            AbiType::Array(Box::new(AbiType::String)),
            AbiType::Bool,
        ];
        let tokens = [
            Token::uint(7u64),
            Token::Array(vec![Token::string("a"), Token::string("b")]),
            Token::Bool(true),
        ];
        let encoded = encode(&types, &tokens).unwrap();
        let word = |i: usize| hex_of(&encoded[i * 32..(i + 1) * 32]);

        assert_eq!(word(1), format!("{:064x}", 0x60));
        assert_eq!(word(2), format!("{:064x}", 1));
        assert_eq!(word(3), format!("{:064x}", 2));
        assert_eq!(word(4), format!("{:064x}", 0x40));
        assert_eq!(word(5), format!("{:064x}", 0x80));
        assert_eq!(word(6), format!("{:064x}", 1));
        assert_eq!(encoded.len(), 10 * 32);
    }

    #[test]
    fn test_encode_static_tuple_inline() {
        let ty = AbiType::Tuple(vec![AbiType::Uint(8), AbiType::Bool]);
        let token = Token::Tuple(vec![Token::uint(3u64), Token::Bool(true)]);
        let encoded = encode(&[ty, AbiType::Uint(256)], &[token, Token::uint(9u64)]).unwrap();
        assert_eq!(encoded.len(), 96);
        assert_eq!(encoded[31], 3);
        assert_eq!(encoded[63], 1);
        assert_eq!(encoded[95], 9);
    }

    #[test]
    fn test_encode_rejects_mismatch() {
        let err = encode(&[AbiType::Uint(256)], &[Token::Bool(true)]).unwrap_err();
        assert!(matches!(err, AbiError::Encoding(_)));

        let err = encode(&[AbiType::Uint(256), AbiType::Bool], &[Token::uint(1u64)]).unwrap_err();
        assert!(matches!(err, AbiError::Encoding(_)));

        let err = encode(&[AbiType::Uint(8)], &[Token::uint(300u64)]).unwrap_err();
        assert!(err.to_string().contains("argument 0"));
    }

    #[test]
    fn test_encode_rejects_invalid_type() {
        assert!(matches!(
            encode(&[AbiType::Uint(7)], &[Token::uint(1u64)]),
            Err(AbiError::InvalidType(_))
        ));
    }

    #[test]
    fn test_encode_deploy_data() {
        let data = encode_deploy_data("0x6080", &[AbiType::Bool], &[Token::Bool(true)]).unwrap();
        assert_eq!(&data[..2], &[0x60, 0x80]);
        assert_eq!(data.len(), 34);
        assert!(encode_deploy_data("0xzz", &[], &[]).is_err());
    }
}
