use serde::Serialize;

use crate::did::{did_to_public_key, public_key_to_did};
use crate::error::CryptoError;
use crate::keys::{KeyPair, PublicKey};
use crate::signing::{sign, sign_canonical, Signature};

/// A participant's self-certifying identity.
///
/// The local user's identity carries the key pair; identities of peers are
/// reconstructed from their DID alone and can only verify.
#[derive(Debug)]
pub struct Identity {
    did: String,
    public_key: PublicKey,
    keypair: Option<KeyPair>,
}

/// Generate a fresh Ed25519 identity.
pub fn generate_identity() -> Identity {
    let identity = Identity::from_keypair(KeyPair::generate());
    tracing::info!(did = %identity.did, "identity generated");
    identity
}

impl Identity {
    pub fn from_keypair(keypair: KeyPair) -> Self {
        let public_key = keypair.public_key();
        Self {
            did: public_key_to_did(&public_key),
            public_key,
            keypair: Some(keypair),
        }
    }

    /// Restore the local identity from persisted secret bytes.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        Ok(Self::from_keypair(KeyPair::from_bytes(bytes)?))
    }

    /// A verify-only identity recovered from a DID.
    pub fn from_did(did: &str) -> Result<Self, CryptoError> {
        let public_key = did_to_public_key(did)?;
        Ok(Self {
            did: did.to_string(),
            public_key,
            keypair: None,
        })
    }

    pub fn did(&self) -> &str {
        &self.did
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn keypair(&self) -> Option<&KeyPair> {
        self.keypair.as_ref()
    }

    pub fn can_sign(&self) -> bool {
        self.keypair.is_some()
    }

    pub fn sign(&self, message: &[u8]) -> Result<Signature, CryptoError> {
        let keypair = self
            .keypair
            .as_ref()
            .ok_or_else(|| CryptoError::MissingPrivateKey(self.did.clone()))?;
        Ok(sign(message, keypair))
    }

    /// Sign the canonical form of a payload, or `None` for verify-only identities.
    pub fn try_sign_canonical<T: Serialize>(&self, payload: &T) -> Result<Option<Signature>, CryptoError> {
        match &self.keypair {
            Some(kp) => sign_canonical(payload, kp).map(Some),
            None => Ok(None),
        }
    }
}
