use ed25519_dalek::{SigningKey, VerifyingKey, SECRET_KEY_LENGTH};
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use crate::did::{did_to_public_key, public_key_to_did};
use crate::error::CryptoError;

/// The device-local signing key behind a `did:key` identity.
///
/// Never leaves the device except through [`KeyPair::secret_bytes`], which
/// hands out a zeroizing copy for the local keystore.
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    pub fn from_seed(seed: &[u8; SECRET_KEY_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Restore from bytes written by [`KeyPair::secret_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let seed: Zeroizing<[u8; SECRET_KEY_LENGTH]> =
            Zeroizing::new(bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
                expected: SECRET_KEY_LENGTH,
                actual: bytes.len(),
            })?);
        Ok(Self::from_seed(&seed))
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.signing_key.verifying_key())
    }

    /// The `did:key` this key pair controls.
    pub fn did(&self) -> String {
        self.public_key().to_did()
    }

    pub fn secret_bytes(&self) -> Zeroizing<[u8; SECRET_KEY_LENGTH]> {
        Zeroizing::new(self.signing_key.to_bytes())
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("KeyPair").field(&self.did()).finish()
    }
}

/// Ed25519 verifying key, as embedded in a `did:key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(VerifyingKey);

impl PublicKey {
    /// Parse 32 raw bytes. Points that do not decompress are rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let raw: [u8; 32] = bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: 32,
            actual: bytes.len(),
        })?;
        VerifyingKey::from_bytes(&raw)
            .map(Self)
            .map_err(|e| CryptoError::InvalidInput(format!("invalid public key: {}", e)))
    }

    pub fn from_did(did: &str) -> Result<Self, CryptoError> {
        did_to_public_key(did)
    }

    pub fn to_did(&self) -> String {
        public_key_to_did(self)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }

    pub(crate) fn verifying_key(&self) -> &VerifyingKey {
        &self.0
    }
}
