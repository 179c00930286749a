//! Web-of-Trust Core: shared types, errors, configuration and change
//! notification for the attestation and profile discovery crates.

pub mod config;
pub mod error;
pub mod observer;
pub mod types;

pub use config::{DiscoveryConfig, LayoutConfig, MAX_2ND_DEGREE_PROFILES};
pub use error::CoreError;
pub use observer::{ChangeNotifier, SubscriptionId};
pub use types::{DiscoverySource, LoadState, SignatureStatus, TrustLevel};
