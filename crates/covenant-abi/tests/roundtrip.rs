//! Property tests: decoding inverts encoding for arbitrary well-typed values

use covenant_abi::{decode, encode, AbiType, Token, I256};
use covenant_primitives::{Address, U256};
use proptest::collection::vec;
use proptest::prelude::*;

fn arb_type() -> impl Strategy<Value = AbiType> {
    let leaf = prop_oneof![
        (1usize..=32).prop_map(|n| AbiType::Uint(n * 8)),
        (1usize..=32).prop_map(|n| AbiType::Int(n * 8)),
        Just(AbiType::Bool),
        Just(AbiType::Address),
        Just(AbiType::Bytes),
        Just(AbiType::String),
        (1usize..=32).prop_map(AbiType::FixedBytes),
        ((1usize..=32), (0usize..=80)).prop_map(|(m, n)| AbiType::Fixed(m * 8, n)),
        ((1usize..=32), (0usize..=80)).prop_map(|(m, n)| AbiType::UFixed(m * 8, n)),
    ];
    leaf.prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(|t| AbiType::Array(Box::new(t))),
            (inner.clone(), 1usize..4).prop_map(|(t, k)| AbiType::FixedArray(Box::new(t), k)),
            vec(inner, 1..4).prop_map(AbiType::Tuple),
        ]
    })
}

fn mask(raw: U256, bits: usize) -> U256 {
    if bits == 256 {
        raw
    } else {
        raw & ((U256::one() << bits) - U256::one())
    }
}

fn sign_extend(raw: U256, bits: usize) -> I256 {
    if bits == 256 {
        return I256::from_raw(raw);
    }
    let low = mask(raw, bits);
    if low.bit(bits - 1) {
        I256::from_raw(low | !((U256::one() << bits) - U256::one()))
    } else {
        I256::from_raw(low)
    }
}

fn arb_word() -> impl Strategy<Value = U256> {
    any::<[u8; 32]>().prop_map(|b| U256::from_big_endian(&b))
}

fn arb_value(ty: &AbiType) -> BoxedStrategy<Token> {
    match ty.clone() {
        AbiType::Uint(bits) => arb_word().prop_map(move |v| Token::Uint(mask(v, bits))).boxed(),
        AbiType::UFixed(bits, _) => {
            arb_word().prop_map(move |v| Token::UFixed(mask(v, bits))).boxed()
        }
        AbiType::Int(bits) => arb_word()
            .prop_map(move |v| Token::Int(sign_extend(v, bits)))
            .boxed(),
        AbiType::Fixed(bits, _) => arb_word()
            .prop_map(move |v| Token::Fixed(sign_extend(v, bits)))
            .boxed(),
        AbiType::Bool => any::<bool>().prop_map(Token::Bool).boxed(),
        AbiType::Address => any::<[u8; 20]>()
            .prop_map(|b| Token::Address(Address::from_bytes(b)))
            .boxed(),
        AbiType::FixedBytes(size) => vec(any::<u8>(), size).prop_map(Token::FixedBytes).boxed(),
        AbiType::Bytes => vec(any::<u8>(), 0..70).prop_map(Token::Bytes).boxed(),
        AbiType::String => any::<String>().prop_map(Token::String).boxed(),
        AbiType::Array(inner) => vec(arb_value(&inner), 0..4).prop_map(Token::Array).boxed(),
        AbiType::FixedArray(inner, len) => {
            vec(arb_value(&inner), len).prop_map(Token::FixedArray).boxed()
        }
        AbiType::Tuple(types) => types
            .iter()
            .map(arb_value)
            .collect::<Vec<_>>()
            .prop_map(Token::Tuple)
            .boxed(),
    }
}

fn arb_params() -> impl Strategy<Value = (Vec<AbiType>, Vec<Token>)> {
    vec(arb_type(), 0..4).prop_flat_map(|types| {
        let values = types.iter().map(arb_value).collect::<Vec<_>>();
        (Just(types), values)
    })
}

proptest! {
    #[test]
    fn decode_inverts_encode((types, tokens) in arb_params()) {
        let encoded = encode(&types, &tokens).unwrap();
        prop_assert_eq!(encoded.len() % 32, 0);
        prop_assert_eq!(decode(&types, &encoded).unwrap(), tokens);
    }

    #[test]
    fn truncated_input_never_panics((types, tokens) in arb_params(), cut in any::<prop::sample::Index>()) {
        let encoded = encode(&types, &tokens).unwrap();
        if !encoded.is_empty() {
            let len = cut.index(encoded.len());
            // Either a clean error or a successful decode of a shorter prefix
            let _ = decode(&types, &encoded[..len]);
        }
    }
}

#[test]
fn test_truncated_uint_is_decoding_error() {
    let err = decode(&[AbiType::Uint(256)], &[0u8; 31]).unwrap_err();
    assert!(err.is_decoding());
}
