//! ABI decoding

use covenant_primitives::{decode_hex, Address, U256, WORD_SIZE};

use crate::{AbiError, AbiType, Token, I256};

/// Decode `data` as a tuple of `types`.
///
/// Offsets and lengths are bounds-checked against the input before anything
/// is allocated. Every head area and byte body reached through an offset is
/// charged against the input length, so offsets that alias the same region
/// cannot make the output outgrow the input. Trailing bytes after the encoded
/// tuple are ignored.
pub fn decode(types: &[AbiType], data: &[u8]) -> Result<Vec<Token>, AbiError> {
    for ty in types {
        ty.validate()?;
    }
    let types: Vec<&AbiType> = types.iter().collect();
    let mut budget = data.len();
    decode_params(&types, data, 0, &mut budget)
}

/// Decode a hex string (with or without `0x`)
pub fn decode_hex_data(types: &[AbiType], data: &str) -> Result<Vec<Token>, AbiError> {
    let bytes = decode_hex(data).map_err(|e| AbiError::Decoding(e.to_string()))?;
    decode(types, &bytes)
}

/// Decode a single static value stored in one 32-byte word, such as an
/// indexed event topic
pub fn decode_word(ty: &AbiType, word: &[u8; 32]) -> Result<Token, AbiError> {
    ty.validate()?;
    if ty.head_words() != 1 || ty.is_dynamic() {
        return Err(AbiError::Decoding(format!("{} does not fit in one word", ty)));
    }
    decode_static(ty, word, 0)
}

fn decode_params(
    types: &[&AbiType],
    data: &[u8],
    base: usize,
    budget: &mut usize,
) -> Result<Vec<Token>, AbiError> {
    let mut tokens = Vec::with_capacity(types.len());
    let mut cursor = base;

    for param_type in types {
        if param_type.is_dynamic() {
            let offset = read_usize(data, cursor, "offset")?;
            let start = base
                .checked_add(offset)
                .filter(|start| *start <= data.len())
                .ok_or_else(|| {
                    AbiError::Decoding(format!(
                        "offset {} at byte {} points outside {} bytes of input",
                        offset,
                        cursor,
                        data.len()
                    ))
                })?;
            tokens.push(decode_dynamic(param_type, data, start, budget)?);
            cursor += WORD_SIZE;
        } else {
            tokens.push(decode_static(param_type, data, cursor)?);
            cursor += param_type.head_words() * WORD_SIZE;
        }
    }

    Ok(tokens)
}

fn decode_static(param_type: &AbiType, data: &[u8], pos: usize) -> Result<Token, AbiError> {
    match param_type {
        AbiType::Address => Ok(Token::Address(Address::from_word(read_word(data, pos)?))),
        AbiType::Uint(bits) => Ok(Token::Uint(read_uint(data, pos, *bits, param_type)?)),
        AbiType::UFixed(bits, _) => Ok(Token::UFixed(read_uint(data, pos, *bits, param_type)?)),
        AbiType::Int(bits) => Ok(Token::Int(read_int(data, pos, *bits, param_type)?)),
        AbiType::Fixed(bits, _) => Ok(Token::Fixed(read_int(data, pos, *bits, param_type)?)),
        AbiType::Bool => {
            let value = U256::from_big_endian(read_word(data, pos)?);
            if value > U256::one() {
                return Err(AbiError::Decoding(format!(
                    "invalid bool {} at byte {}",
                    value, pos
                )));
            }
            Ok(Token::Bool(!value.is_zero()))
        }
        AbiType::FixedBytes(size) => {
            let word = read_word(data, pos)?;
            Ok(Token::FixedBytes(word[..*size].to_vec()))
        }
        AbiType::FixedArray(inner, len) => {
            let step = inner.head_words() * WORD_SIZE;
            let mut tokens = Vec::with_capacity(*len);
            for i in 0..*len {
                tokens.push(decode_static(inner, data, pos + i * step)?);
            }
            Ok(Token::FixedArray(tokens))
        }
        AbiType::Tuple(types) => {
            let mut tokens = Vec::with_capacity(types.len());
            let mut cursor = pos;
            for ty in types {
                tokens.push(decode_static(ty, data, cursor)?);
                cursor += ty.head_words() * WORD_SIZE;
            }
            Ok(Token::Tuple(tokens))
        }
        AbiType::Bytes | AbiType::String | AbiType::Array(_) => Err(AbiError::Decoding(format!(
            "{} is dynamic",
            param_type
        ))),
    }
}

fn decode_dynamic(
    param_type: &AbiType,
    data: &[u8],
    start: usize,
    budget: &mut usize,
) -> Result<Token, AbiError> {
    match param_type {
        AbiType::Bytes => {
            let bytes = read_bytes(data, start)?;
            charge(budget, bytes.len())?;
            Ok(Token::Bytes(bytes.to_vec()))
        }
        AbiType::String => {
            let bytes = read_bytes(data, start)?;
            charge(budget, bytes.len())?;
            let s = String::from_utf8(bytes.to_vec())
                .map_err(|e| AbiError::Decoding(format!("invalid UTF-8 string: {}", e)))?;
            Ok(Token::String(s))
        }
        AbiType::Array(inner) => {
            let len = read_usize(data, start, "array length")?;
            let body = start + WORD_SIZE;
            // Each element needs at least one head word, unless it is zero-sized
            let min_size = inner.head_words().max(1) * WORD_SIZE;
            let available = data.len().saturating_sub(body);
            if len > available / min_size {
                return Err(AbiError::Decoding(format!(
                    "array length {} exceeds the {} bytes remaining",
                    len, available
                )));
            }
            charge(budget, len * min_size)?;
            let inner_types = vec![inner.as_ref(); len];
            Ok(Token::Array(decode_params(&inner_types, data, body, budget)?))
        }
        AbiType::FixedArray(inner, len) => {
            charge(budget, inner.head_words() * len * WORD_SIZE)?;
            let inner_types = vec![inner.as_ref(); *len];
            Ok(Token::FixedArray(decode_params(&inner_types, data, start, budget)?))
        }
        AbiType::Tuple(types) => {
            let head: usize = types.iter().map(|t| t.head_words()).sum();
            charge(budget, head * WORD_SIZE)?;
            let types: Vec<&AbiType> = types.iter().collect();
            Ok(Token::Tuple(decode_params(&types, data, start, budget)?))
        }
        _ => decode_static(param_type, data, start),
    }
}

/// Subtract a region's size from what is left of the input
fn charge(budget: &mut usize, size: usize) -> Result<(), AbiError> {
    *budget = budget.checked_sub(size).ok_or_else(|| {
        AbiError::Decoding(format!(
            "offsets reuse input: {} more bytes requested with {} unclaimed",
            size, budget
        ))
    })?;
    Ok(())
}

fn read_word(data: &[u8], pos: usize) -> Result<&[u8; 32], AbiError> {
    pos.checked_add(WORD_SIZE)
        .and_then(|end| data.get(pos..end))
        .and_then(|slice| slice.try_into().ok())
        .ok_or_else(|| {
            AbiError::Decoding(format!(
                "need 32 bytes at byte {}, input is {} bytes",
                pos,
                data.len()
            ))
        })
}

/// Read a word used as an offset or length; anything past the input is invalid
fn read_usize(data: &[u8], pos: usize, what: &str) -> Result<usize, AbiError> {
    let value = U256::from_big_endian(read_word(data, pos)?);
    if value > U256::from(data.len()) {
        return Err(AbiError::Decoding(format!(
            "{} {} at byte {} exceeds input length {}",
            what,
            value,
            pos,
            data.len()
        )));
    }
    Ok(value.as_usize())
}

fn read_bytes(data: &[u8], start: usize) -> Result<&[u8], AbiError> {
    let len = read_usize(data, start, "length")?;
    let body = start + WORD_SIZE;
    body.checked_add(len)
        .and_then(|end| data.get(body..end))
        .ok_or_else(|| {
            AbiError::Decoding(format!(
                "{} bytes at byte {} run past input length {}",
                len,
                body,
                data.len()
            ))
        })
}

fn read_uint(data: &[u8], pos: usize, bits: usize, ty: &AbiType) -> Result<U256, AbiError> {
    let value = U256::from_big_endian(read_word(data, pos)?);
    if value.bits() > bits {
        return Err(AbiError::Decoding(format!(
            "value {} at byte {} exceeds {}",
            value, pos, ty
        )));
    }
    Ok(value)
}

fn read_int(data: &[u8], pos: usize, bits: usize, ty: &AbiType) -> Result<I256, AbiError> {
    let value = I256::from_raw(U256::from_big_endian(read_word(data, pos)?));
    if !value.fits_bits(bits) {
        return Err(AbiError::Decoding(format!(
            "value at byte {} is not a sign-extended {}",
            pos, ty
        )));
    }
    Ok(value)
}
