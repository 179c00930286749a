use wot_core::DiscoverySource;

/// Changes published by [`ProfileDiscovery`](crate::ProfileDiscovery).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryEvent {
    /// A profile was created or its merged view changed.
    ProfileUpdated { did: String, source: DiscoverySource },
    /// A profile was dropped (revocation or second-degree eviction).
    ProfileEvicted { did: String },
    /// A document URL entered the registry or changed source.
    EntryRegistered { url: String, source: DiscoverySource },
    /// A document could not be loaded.
    EntryUnavailable { url: String },
}
