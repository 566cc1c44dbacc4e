//! Ed25519 operator key loaded from configuration.

use base64::{engine::general_purpose::STANDARD as B64, Engine};
use sui_crypto::ed25519::Ed25519PrivateKey;
use sui_crypto::SuiSigner;
use sui_sdk_types::{Address, Ed25519PublicKey, SignatureScheme, Transaction, UserSignature};
use std::fmt;

use crate::error::{Error, Result};

#[derive(Clone)]
pub struct SuiKeypair {
    key: Ed25519PrivateKey,
    address: Address,
}

impl SuiKeypair {
    pub fn from_secret_bytes(secret: &[u8; 32]) -> Self {
        let key = Ed25519PrivateKey::new(*secret);
        let address = key.public_key().derive_address();
        Self { key, address }
    }

    /// Decode a base64 secret. A 33-byte value carries a leading Ed25519
    /// scheme flag which is dropped.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let raw = B64
            .decode(encoded.trim())
            .map_err(|e| Error::Configuration(format!("SUI_PRIVATE_KEY n'est pas du base64: {e}")))?;
        let secret: &[u8] = match raw.len() {
            33 if raw[0] == SignatureScheme::Ed25519.to_u8() => &raw[1..],
            33 => {
                return Err(Error::Configuration(
                    "SUI_PRIVATE_KEY: seules les clés ed25519 sont acceptées".into(),
                ))
            }
            32 => &raw,
            n => {
                return Err(Error::Configuration(format!(
                    "SUI_PRIVATE_KEY: 32 octets attendus, {n} reçus"
                )))
            }
        };
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(secret);
        Ok(Self::from_secret_bytes(&bytes))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        self.key.public_key()
    }

    /// Sign over the `TransactionData` intent digest.
    pub fn sign_transaction(&self, tx: &Transaction) -> Result<UserSignature> {
        self.key
            .sign_transaction(tx)
            .map_err(|e| Error::Internal(format!("signature impossible: {e}")))
    }
}

impl fmt::Debug for SuiKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuiKeypair")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
