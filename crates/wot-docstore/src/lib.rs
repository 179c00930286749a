//! Document store collaborator.
//!
//! The CRDT layer that persists and syncs documents is external; this crate
//! defines the narrow interface the attestation store and discovery engine
//! consume, plus [`MemoryDocumentStore`] for tests and local tooling.

pub mod error;
pub mod memory;
pub mod store;

pub use error::DocStoreError;
pub use memory::{Availability, MemoryDocumentStore};
pub use store::{ChangeCallback, DocHandle, DocumentStore};
