//! Identity and signature primitives.
//!
//! - `did:key` identifiers derived from Ed25519 public keys and recoverable
//!   back to the key without any lookup
//! - signing and verification of canonical JSON payloads
//! - [`SignatureStatus`](wot_core::SignatureStatus) classification that never
//!   fails on malformed input

pub mod canonical;
pub mod did;
pub mod error;
pub mod identity;
pub mod keys;
pub mod signing;

pub use canonical::{canonical_bytes, canonical_json};
pub use did::{did_to_public_key, is_valid_did, public_key_to_did, short_did};
pub use error::CryptoError;
pub use identity::{generate_identity, Identity};
pub use keys::{KeyPair, PublicKey};
pub use signing::{
    sign, sign_canonical, signature_status, verify, verify_detached, Signature,
};
