//! Trust attestations.
//!
//! Every user owns a personal document holding the attestations they gave
//! (`trustGiven`) and copies of the attestations others gave them
//! (`trustReceived`). [`TrustStore`] mutates and reads that document and
//! propagates new attestations into the trustee's document.

pub mod attestation;
pub mod document;
pub mod error;
pub mod store;

pub use attestation::{AttestationRecord, LegacyAttestation, TrustAttestation};
pub use document::{ProfileSection, UserDocument, WorkspaceDocument, WorkspaceIdentity};
pub use error::AttestationError;
pub use store::{TrustOutcome, TrustStore};
