//! Detached Ed25519 signatures over canonical bytes.
//!
//! Documents carry signatures as lowercase hex next to the signed fields.
//! Verification resolves the signer's key from its `did:key`, so a
//! signature is always checked against the DID that claims it.

use ed25519_dalek::{Signer, Verifier, SIGNATURE_LENGTH};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use wot_core::SignatureStatus;

use crate::canonical::canonical_bytes;
use crate::did::did_to_public_key;
use crate::error::CryptoError;
use crate::keys::{KeyPair, PublicKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(ed25519_dalek::Signature);

impl Signature {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0.to_bytes())
    }

    pub fn from_hex(encoded: &str) -> Result<Self, CryptoError> {
        let raw = hex::decode(encoded)
            .map_err(|e| CryptoError::InvalidInput(format!("signature is not hex: {}", e)))?;
        let raw: [u8; SIGNATURE_LENGTH] = raw.as_slice().try_into().map_err(|_| {
            CryptoError::InvalidInput(format!(
                "signature must be {} bytes, got {}",
                SIGNATURE_LENGTH,
                raw.len()
            ))
        })?;
        Ok(Self(ed25519_dalek::Signature::from_bytes(&raw)))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Signature {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

pub fn sign(message: &[u8], keypair: &KeyPair) -> Signature {
    Signature(keypair.signing_key().sign(message))
}

/// Sign the canonical JSON form of `payload`; key order does not matter.
pub fn sign_canonical<T: Serialize>(payload: &T, keypair: &KeyPair) -> Result<Signature, CryptoError> {
    Ok(sign(&canonical_bytes(payload)?, keypair))
}

pub fn verify(message: &[u8], signature: &Signature, signer: &PublicKey) -> Result<(), CryptoError> {
    signer
        .verifying_key()
        .verify(message, &signature.0)
        .map_err(|_| CryptoError::SignatureVerificationFailed)
}

/// Check a hex signature against the key embedded in `did`.
///
/// Malformed DIDs and signatures count as a failed check.
pub fn verify_detached(message: &[u8], signature_hex: &str, did: &str) -> bool {
    let result = did_to_public_key(did)
        .and_then(|signer| verify(message, &Signature::from_hex(signature_hex)?, &signer));
    if let Err(e) = &result {
        tracing::debug!(did = %did, error = %e, "signature rejected");
    }
    result.is_ok()
}

/// Classify the optional signature `did` attached to `message`.
pub fn signature_status(message: &[u8], signature_hex: Option<&str>, did: &str) -> SignatureStatus {
    match signature_hex {
        None => SignatureStatus::Missing,
        Some(sig) if verify_detached(message, sig, did) => SignatureStatus::Valid,
        Some(_) => SignatureStatus::Invalid,
    }
}
