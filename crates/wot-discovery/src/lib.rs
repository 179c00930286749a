//! Profile Discovery & Merge Engine
//!
//! Reconciles profile facts arriving asynchronously from several sources of
//! differing trustworthiness into one [`TrackedProfile`] per DID:
//! - the local user's own document
//! - 1st-degree trust relationships (given and received)
//! - 2nd-degree relationships crawled from loaded 1st-degree documents,
//!   capped with FIFO eviction
//! - out-of-band registrations (scanned codes)
//! - shared workspace identity tables

pub mod engine;
pub mod error;
pub mod events;
pub mod loader;
pub mod payload;
pub mod profile;
pub mod registry;

pub use engine::ProfileDiscovery;
pub use error::DiscoveryError;
pub use events::DiscoveryEvent;
pub use loader::{DocumentLoader, StoreDocumentLoader};
pub use payload::DiscoveryPayload;
pub use profile::{merge_profile, MergeOutcome, TrackedProfile};
pub use registry::{DocUrlEntry, DocUrlRegistry, RegisterOutcome};
