//! Transaction signing credentials

use bytes::Bytes;
use covenant_crypto::{public_key_to_address, sign, PrivateKey, PublicKey, Signature};
use covenant_primitives::{decode_hex, Address, H256};
use covenant_types::TransactionRequest;
use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;
use zeroize::Zeroize;

use crate::ContractError;

/// Signs transactions on behalf of one account
pub trait Credentials: Send + Sync {
    /// Sender address
    fn address(&self) -> Address;

    /// Sign `request` for `chain_id`, returning raw bytes ready for broadcast
    fn sign_transaction(
        &self,
        request: &TransactionRequest,
        chain_id: u64,
    ) -> Result<Bytes, ContractError>;
}

/// In-memory secp256k1 key
///
/// Not `Clone`; share it behind an `Arc` instead of duplicating the key.
pub struct Wallet {
    private_key: PrivateKey,
    address: Address,
}

impl Wallet {
    /// Create a new random wallet
    pub fn new_random() -> Self {
        let private_key = SigningKey::random(&mut OsRng);
        let address = public_key_to_address(private_key.verifying_key());
        Self {
            private_key,
            address,
        }
    }

    /// Create a wallet from a 32-byte private key
    pub fn from_private_key(key: &[u8; 32]) -> Result<Self, ContractError> {
        let private_key = SigningKey::from_slice(key)
            .map_err(|e| ContractError::Signing(format!("invalid private key: {}", e)))?;
        let address = public_key_to_address(private_key.verifying_key());
        Ok(Self {
            private_key,
            address,
        })
    }

    /// Create a wallet from a hex private key, with or without `0x`
    pub fn from_private_key_hex(hex: &str) -> Result<Self, ContractError> {
        let mut bytes = decode_hex(hex)
            .map_err(|e| ContractError::Signing(format!("invalid private key: {}", e)))?;
        if bytes.len() != 32 {
            let got = bytes.len();
            bytes.zeroize();
            return Err(ContractError::Signing(format!(
                "invalid private key: expected 32 bytes, got {}",
                got
            )));
        }

        let mut key = [0u8; 32];
        key.copy_from_slice(&bytes);
        bytes.zeroize();

        let result = Self::from_private_key(&key);
        key.zeroize();
        result
    }

    /// Public key
    pub fn public_key(&self) -> &PublicKey {
        self.private_key.verifying_key()
    }

    /// Sign a 32-byte hash
    pub fn sign_hash(&self, hash: &H256) -> Result<Signature, ContractError> {
        sign(hash, &self.private_key).map_err(|e| ContractError::Signing(e.to_string()))
    }
}

impl Credentials for Wallet {
    fn address(&self) -> Address {
        self.address
    }

    fn sign_transaction(
        &self,
        request: &TransactionRequest,
        chain_id: u64,
    ) -> Result<Bytes, ContractError> {
        let signature = self.sign_hash(&request.signing_hash(chain_id))?;
        Ok(Bytes::from(request.encode_signed(chain_id, &signature)))
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
