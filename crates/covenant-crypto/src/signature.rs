//! Recoverable ECDSA signatures over secp256k1

use covenant_primitives::{Address, H256};
use k256::ecdsa::{RecoveryId, Signature as K256Signature, SigningKey, VerifyingKey};

use crate::{keccak256, CryptoError};

/// Public key
pub type PublicKey = VerifyingKey;

/// Private key
pub type PrivateKey = SigningKey;

/// Recoverable signature with low-s normalization applied
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    /// r component
    pub r: [u8; 32],
    /// s component
    pub s: [u8; 32],
    /// Recovery id, 0 or 1
    pub recovery_id: u8,
}

impl Signature {
    /// 65-byte `r || s || v` form with `v = 27 + recovery_id`
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut bytes = [0u8; 65];
        bytes[..32].copy_from_slice(&self.r);
        bytes[32..64].copy_from_slice(&self.s);
        bytes[64] = 27 + self.recovery_id;
        bytes
    }
}

/// Sign a 32-byte prehash
pub fn sign(message_hash: &H256, private_key: &PrivateKey) -> Result<Signature, CryptoError> {
    let (mut signature, mut recovery_id) = private_key
        .sign_prehash_recoverable(message_hash.as_bytes())
        .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

    // EIP-2: only low-s signatures are valid on chain
    if let Some(normalized) = signature.normalize_s() {
        signature = normalized;
        recovery_id = RecoveryId::from_byte(recovery_id.to_byte() ^ 1)
            .ok_or_else(|| CryptoError::SigningFailed("bad recovery id".to_string()))?;
    }

    let bytes = signature.to_bytes();
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&bytes[..32]);
    s.copy_from_slice(&bytes[32..]);

    Ok(Signature {
        r,
        s,
        recovery_id: recovery_id.to_byte(),
    })
}

/// Recover the signer address of `message_hash`
pub fn recover_address(message_hash: &H256, signature: &Signature) -> Result<Address, CryptoError> {
    let r: k256::FieldBytes = signature.r.into();
    let s: k256::FieldBytes = signature.s.into();
    let k256_sig = K256Signature::from_scalars(r, s)
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
    let recovery_id = RecoveryId::from_byte(signature.recovery_id).ok_or_else(|| {
        CryptoError::InvalidSignature(format!("recovery id {}", signature.recovery_id))
    })?;

    let key = VerifyingKey::recover_from_prehash(message_hash.as_bytes(), &k256_sig, recovery_id)
        .map_err(|e| CryptoError::RecoveryFailed(e.to_string()))?;
    Ok(public_key_to_address(&key))
}

/// Derive the Ethereum address of a public key
pub fn public_key_to_address(public_key: &PublicKey) -> Address {
    // Uncompressed point is 0x04 || x || y
    let encoded = public_key.to_encoded_point(false);
    let hash = keccak256(&encoded.as_bytes()[1..]);

    let mut addr = [0u8; 20];
    addr.copy_from_slice(&hash.as_bytes()[12..]);
    Address::from_bytes(addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    fn hardhat_key() -> SigningKey {
        let bytes =
            hex::decode("ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80")
                .unwrap();
        SigningKey::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_known_address() {
        let key = hardhat_key();
        assert_eq!(
            public_key_to_address(key.verifying_key()).to_hex(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn test_sign_then_recover() {
        let key = SigningKey::random(&mut OsRng);
        let expected = public_key_to_address(key.verifying_key());
        let hash = keccak256(b"covenant");

        let signature = sign(&hash, &key).unwrap();
        assert!(signature.recovery_id <= 1);
        assert_eq!(recover_address(&hash, &signature).unwrap(), expected);
    }

    #[test]
    fn test_signature_is_low_s() {
        // n / 2
        let half_n =
            hex::decode("7fffffffffffffffffffffffffffffff5d576e7357a4501ddfe92f46681b20a0")
                .unwrap();
        for i in 0..8u8 {
            let key = SigningKey::random(&mut OsRng);
            let signature = sign(&keccak256([i]), &key).unwrap();
            assert!(signature.s.as_slice() <= half_n.as_slice());
        }
    }

    #[test]
    fn test_to_bytes_uses_ethereum_v() {
        let signature = sign(&keccak256(b"v"), &hardhat_key()).unwrap();
        let bytes = signature.to_bytes();
        assert!(bytes[64] == 27 || bytes[64] == 28);
    }
}
