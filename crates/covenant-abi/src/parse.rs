//! Parsers for type strings, signatures and human-readable values

use std::str::FromStr;

use covenant_primitives::{decode_hex, Address, U256};

use crate::{AbiError, AbiType, Token, I256};

impl FromStr for AbiType {
    type Err = AbiError;

    /// Parse a Solidity type such as `uint256`, `bytes32[2][]` or
    /// `(address,uint256)[]`. `uint`/`int`/`fixed`/`ufixed` aliases and
    /// `byte` are accepted and normalized.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_type(s.trim())
    }
}

fn parse_type(s: &str) -> Result<AbiType, AbiError> {
    if s.ends_with(']') {
        let open = s
            .rfind('[')
            .ok_or_else(|| AbiError::Parse(format!("unbalanced brackets in {:?}", s)))?;
        let inner = parse_type(&s[..open])?;
        let dim = &s[open + 1..s.len() - 1];
        if dim.is_empty() {
            return Ok(AbiType::Array(Box::new(inner)));
        }
        let len = dim
            .parse::<usize>()
            .map_err(|_| AbiError::Parse(format!("invalid array size {:?} in {:?}", dim, s)))?;
        return Ok(AbiType::FixedArray(Box::new(inner), len));
    }

    let tuple_body = s.strip_prefix("tuple").unwrap_or(s);
    if let Some(body) = tuple_body
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let types = split_top_level(body)?
            .into_iter()
            .map(|part| parse_type(part.trim()))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(AbiType::Tuple(types));
    }

    match s {
        "address" => return Ok(AbiType::Address),
        "bool" => return Ok(AbiType::Bool),
        "string" => return Ok(AbiType::String),
        "bytes" => return Ok(AbiType::Bytes),
        "byte" => return Ok(AbiType::FixedBytes(1)),
        "uint" => return Ok(AbiType::Uint(256)),
        "int" => return Ok(AbiType::Int(256)),
        "fixed" => return Ok(AbiType::Fixed(128, 18)),
        "ufixed" => return Ok(AbiType::UFixed(128, 18)),
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("ufixed") {
        let (bits, decimals) = parse_fixed_suffix(rest, s)?;
        return AbiType::ufixed(bits, decimals);
    }
    if let Some(rest) = s.strip_prefix("fixed") {
        let (bits, decimals) = parse_fixed_suffix(rest, s)?;
        return AbiType::fixed(bits, decimals);
    }
    if let Some(rest) = s.strip_prefix("uint") {
        return AbiType::uint(parse_size(rest, s)?);
    }
    if let Some(rest) = s.strip_prefix("int") {
        return AbiType::int(parse_size(rest, s)?);
    }
    if let Some(rest) = s.strip_prefix("bytes") {
        return AbiType::fixed_bytes(parse_size(rest, s)?);
    }

    Err(AbiError::Parse(format!("unknown type {:?}", s)))
}

fn parse_size(digits: &str, full: &str) -> Result<usize, AbiError> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AbiError::Parse(format!("unknown type {:?}", full)));
    }
    digits
        .parse()
        .map_err(|_| AbiError::InvalidType(full.to_string()))
}

fn parse_fixed_suffix(rest: &str, full: &str) -> Result<(usize, usize), AbiError> {
    let (bits, decimals) = rest
        .split_once('x')
        .ok_or_else(|| AbiError::Parse(format!("unknown type {:?}", full)))?;
    Ok((parse_size(bits, full)?, parse_size(decimals, full)?))
}

/// Split on commas that are not nested inside brackets, parentheses or quotes
pub(crate) fn split_top_level(s: &str) -> Result<Vec<&str>, AbiError> {
    if s.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '(' | '[' if !in_quotes => depth += 1,
            ')' | ']' if !in_quotes => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| AbiError::Parse(format!("unbalanced {:?}", s)))?;
            }
            ',' if !in_quotes && depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 || in_quotes {
        return Err(AbiError::Parse(format!("unbalanced {:?}", s)));
    }
    parts.push(&s[start..]);
    Ok(parts)
}

/// Split `name(args)rest` into its three parts
pub(crate) fn split_signature(s: &str) -> Result<(&str, &str, &str), AbiError> {
    let s = s.trim();
    let open = s
        .find('(')
        .ok_or_else(|| AbiError::Parse(format!("missing '(' in signature {:?}", s)))?;
    let name = s[..open].trim();
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
    {
        return Err(AbiError::Parse(format!("invalid name in signature {:?}", s)));
    }

    let mut depth = 0usize;
    for (i, c) in s[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    let close = open + i;
                    return Ok((name, &s[open + 1..close], s[close + 1..].trim()));
                }
            }
            _ => {}
        }
    }
    Err(AbiError::Parse(format!("unbalanced signature {:?}", s)))
}

/// Parse a comma-separated list of types
pub fn parse_type_list(s: &str) -> Result<Vec<AbiType>, AbiError> {
    split_top_level(s)?
        .into_iter()
        .map(|part| part.trim().parse())
        .collect()
}

impl Token {
    /// Parse a human-readable value of type `ty`.
    ///
    /// Integers are decimal or `0x` hex, byte strings are hex, arrays are
    /// written `[a,b]` and tuples `(a,b)`. Fixed-point values are decimal
    /// fractions scaled by the type's decimal offset.
    pub fn parse(ty: &AbiType, s: &str) -> Result<Token, AbiError> {
        let s = s.trim();
        let token = match ty {
            AbiType::Uint(_) => Token::Uint(parse_uint(s)?),
            AbiType::Int(_) => Token::Int(parse_int(s)?),
            AbiType::Bool => match s {
                "true" => Token::Bool(true),
                "false" => Token::Bool(false),
                _ => return Err(AbiError::Parse(format!("invalid bool {:?}", s))),
            },
            AbiType::Address => Token::Address(
                Address::from_hex(s).map_err(|e| AbiError::Parse(format!("{:?}: {}", s, e)))?,
            ),
            AbiType::UFixed(_, decimals) => {
                let (negative, abs) = parse_decimal(s, *decimals)?;
                if negative && !abs.is_zero() {
                    return Err(AbiError::Parse(format!("{} is unsigned", ty)));
                }
                Token::UFixed(abs)
            }
            AbiType::Fixed(_, decimals) => {
                let (negative, abs) = parse_decimal(s, *decimals)?;
                Token::Fixed(I256::from_sign_abs(negative, abs))
            }
            AbiType::FixedBytes(_) => Token::FixedBytes(parse_bytes(s)?),
            AbiType::Bytes => Token::Bytes(parse_bytes(s)?),
            AbiType::String => Token::String(unquote(s).to_string()),
            AbiType::Array(inner) => Token::Array(parse_items(inner, s, '[', ']')?),
            AbiType::FixedArray(inner, _) => Token::FixedArray(parse_items(inner, s, '[', ']')?),
            AbiType::Tuple(types) => {
                let parts = split_top_level(enclosed(s, '(', ')')?)?;
                if parts.len() != types.len() {
                    return Err(AbiError::Parse(format!(
                        "{} expects {} components, got {}",
                        ty,
                        types.len(),
                        parts.len()
                    )));
                }
                let items = types
                    .iter()
                    .zip(parts)
                    .map(|(t, part)| Token::parse(t, part))
                    .collect::<Result<Vec<_>, _>>()?;
                Token::Tuple(items)
            }
        };
        token
            .type_check(ty)
            .map_err(|e| AbiError::Parse(format!("{:?}: {}", s, e)))?;
        Ok(token)
    }
}

fn parse_items(inner: &AbiType, s: &str, open: char, close: char) -> Result<Vec<Token>, AbiError> {
    split_top_level(enclosed(s, open, close)?)?
        .into_iter()
        .map(|part| Token::parse(inner, part))
        .collect()
}

fn enclosed(s: &str, open: char, close: char) -> Result<&str, AbiError> {
    s.strip_prefix(open)
        .and_then(|rest| rest.strip_suffix(close))
        .ok_or_else(|| AbiError::Parse(format!("expected {}...{}, got {:?}", open, close, s)))
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(s)
}

fn parse_uint(s: &str) -> Result<U256, AbiError> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => U256::from_str_radix(hex, 16).map_err(|e| format!("{:?}", e)),
        None => U256::from_dec_str(s).map_err(|e| format!("{:?}", e)),
    };
    parsed.map_err(|e| AbiError::Parse(format!("invalid integer {:?}: {}", s, e)))
}

fn parse_int(s: &str) -> Result<I256, AbiError> {
    match s.strip_prefix('-') {
        Some(rest) if rest.starts_with("0x") => Ok(I256::from_sign_abs(true, parse_uint(rest)?)),
        Some(_) => I256::from_dec_str(s),
        None => {
            let abs = parse_uint(s)?;
            if abs.bit(255) {
                return Err(AbiError::Parse(format!("integer {} out of int256 range", s)));
            }
            Ok(I256::from_raw(abs))
        }
    }
}

/// Parse `12.345` into a magnitude scaled by `10^decimals`
fn parse_decimal(s: &str, decimals: usize) -> Result<(bool, U256), AbiError> {
    let invalid = || AbiError::Parse(format!("invalid decimal {:?}", s));
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));
    if (whole.is_empty() && frac.is_empty())
        || !whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }
    if frac.len() > decimals {
        return Err(AbiError::Parse(format!(
            "{:?} has more than {} decimal places",
            s, decimals
        )));
    }

    let scaled = format!("{}{}{}", whole, frac, "0".repeat(decimals - frac.len()));
    let trimmed = scaled.trim_start_matches('0');
    let abs = if trimmed.is_empty() {
        U256::zero()
    } else {
        U256::from_dec_str(trimmed).map_err(|_| invalid())?
    };
    Ok((negative, abs))
}

fn parse_bytes(s: &str) -> Result<Vec<u8>, AbiError> {
    decode_hex(s).map_err(|e| AbiError::Parse(format!("{:?}: {}", s, e)))
}
