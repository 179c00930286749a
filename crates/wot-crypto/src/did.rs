//! `did:key` encoding for Ed25519 public keys.
//!
//! `did:key:z<base58btc(0xed 0x01 || public key)>`

use crate::error::CryptoError;
use crate::keys::PublicKey;

pub const DID_KEY_PREFIX: &str = "did:key:";

/// Multibase prefix for base58btc.
const MULTIBASE_BASE58BTC: char = 'z';

/// Multicodec varint for `ed25519-pub`.
const ED25519_MULTICODEC: [u8; 2] = [0xed, 0x01];

/// Derive the self-certifying identifier for a public key.
pub fn public_key_to_did(public_key: &PublicKey) -> String {
    let mut bytes = Vec::with_capacity(ED25519_MULTICODEC.len() + 32);
    bytes.extend_from_slice(&ED25519_MULTICODEC);
    bytes.extend_from_slice(public_key.as_bytes());
    format!(
        "{}{}{}",
        DID_KEY_PREFIX,
        MULTIBASE_BASE58BTC,
        bs58::encode(bytes).into_string()
    )
}

/// Recover the public key embedded in a `did:key` identifier.
pub fn did_to_public_key(did: &str) -> Result<PublicKey, CryptoError> {
    let encoded = did
        .strip_prefix(DID_KEY_PREFIX)
        .ok_or_else(|| CryptoError::InvalidDid(format!("missing '{}' prefix: {}", DID_KEY_PREFIX, did)))?;
    let encoded = encoded.strip_prefix(MULTIBASE_BASE58BTC).ok_or_else(|| {
        CryptoError::InvalidDid(format!("unsupported multibase encoding: {}", did))
    })?;
    let bytes = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| CryptoError::InvalidDid(format!("invalid base58: {}", e)))?;
    let key_bytes = bytes
        .strip_prefix(&ED25519_MULTICODEC[..])
        .ok_or_else(|| CryptoError::InvalidDid(format!("not an Ed25519 key: {}", did)))?;
    PublicKey::from_bytes(key_bytes).map_err(|e| CryptoError::InvalidDid(e.to_string()))
}

pub fn is_valid_did(did: &str) -> bool {
    did_to_public_key(did).is_ok()
}

/// Abbreviated form for display, e.g. `did:key:z6Mk…a1b2c3`.
pub fn short_did(did: &str) -> String {
    let body = did.strip_prefix(DID_KEY_PREFIX).unwrap_or(did);
    let chars: Vec<char> = body.chars().collect();
    if chars.len() <= 12 {
        return did.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 6..].iter().collect();
    format!("{}{}…{}", DID_KEY_PREFIX, head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyPair;

    #[test]
    fn test_did_roundtrip() {
        for _ in 0..16 {
            let kp = KeyPair::generate();
            let did = public_key_to_did(&kp.public_key());
            assert_eq!(did_to_public_key(&did).unwrap(), kp.public_key());
        }
    }

    #[test]
    fn test_did_format() {
        let kp = KeyPair::from_seed(&[1u8; 32]);
        let did = public_key_to_did(&kp.public_key());
        // Ed25519 did:key identifiers always start with z6Mk.
        assert!(did.starts_with("did:key:z6Mk"), "{}", did);
    }

    #[test]
    fn test_did_deterministic() {
        let a = public_key_to_did(&KeyPair::from_seed(&[9u8; 32]).public_key());
        let b = public_key_to_did(&KeyPair::from_seed(&[9u8; 32]).public_key());
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_wrong_prefix() {
        assert!(matches!(
            did_to_public_key("did:web:example.com"),
            Err(CryptoError::InvalidDid(_))
        ));
    }

    #[test]
    fn test_rejects_wrong_multibase() {
        assert!(did_to_public_key("did:key:f00ff").is_err());
    }

    #[test]
    fn test_rejects_bad_base58() {
        assert!(did_to_public_key("did:key:z0OIl").is_err());
    }

    #[test]
    fn test_rejects_wrong_multicodec() {
        let mut bytes = vec![0xe7, 0x01];
        bytes.extend_from_slice(&[3u8; 32]);
        let did = format!("did:key:z{}", bs58::encode(bytes).into_string());
        assert!(did_to_public_key(&did).is_err());
    }

    #[test]
    fn test_rejects_truncated_key() {
        let mut bytes = ED25519_MULTICODEC.to_vec();
        bytes.extend_from_slice(&[3u8; 20]);
        let did = format!("did:key:z{}", bs58::encode(bytes).into_string());
        assert!(!is_valid_did(&did));
    }

    #[test]
    fn test_short_did() {
        let did = public_key_to_did(&KeyPair::from_seed(&[5u8; 32]).public_key());
        let short = short_did(&did);
        assert!(short.starts_with("did:key:z6Mk"));
        assert!(short.contains('…'));
        assert!(short.len() < did.len());
        assert_eq!(short_did("did:key:zabc"), "did:key:zabc");
    }
}
