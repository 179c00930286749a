//! Fixtures shared by the integration scenarios: a set of peers whose
//! personal documents live in one in-memory document store.

use std::sync::Arc;
use std::time::Duration;

use wot_attestation::TrustStore;
use wot_core::DiscoveryConfig;
use wot_crypto::generate_identity;
use wot_discovery::{ProfileDiscovery, StoreDocumentLoader};
use wot_docstore::{Availability, MemoryDocumentStore};

/// A participant with a personal document in the shared store.
pub struct Peer {
    pub name: String,
    pub store: TrustStore,
}

impl Peer {
    pub fn did(&self) -> &str {
        self.store.did()
    }

    pub fn doc_url(&self) -> &str {
        self.store.doc_url()
    }
}

/// Documents reachable by every peer.
pub struct Network {
    pub documents: Arc<MemoryDocumentStore>,
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

impl Network {
    pub fn new() -> Self {
        Self {
            documents: Arc::new(MemoryDocumentStore::new()),
        }
    }

    /// Create a peer with a signed display name.
    pub async fn join(&self, name: &str) -> Peer {
        let identity = Arc::new(generate_identity());
        let store = TrustStore::create(identity, self.documents.clone())
            .await
            .expect("create personal document")
            .with_propagation_timeout(Duration::from_millis(200));
        store
            .set_profile(Some(name.to_string()), None)
            .expect("set profile");
        Peer {
            name: name.to_string(),
            store,
        }
    }

    pub fn set_online(&self, peer: &Peer, online: bool) {
        let availability = if online {
            Availability::Online
        } else {
            Availability::Offline
        };
        self.documents.set_availability(peer.doc_url(), availability);
    }

    /// A discovery engine for `peer` with its own profile and trust synced.
    pub fn discovery_for(&self, peer: &Peer, config: DiscoveryConfig) -> ProfileDiscovery {
        let loader = Arc::new(StoreDocumentLoader::new(self.documents.clone()));
        let discovery = ProfileDiscovery::new(peer.did(), loader, config);
        discovery
            .update_self_profile(&peer.store.document(), Some(peer.doc_url()))
            .expect("own profile");
        discovery.sync_trust(&peer.store.trust_given(), &peer.store.trust_received());
        discovery
    }

    /// [`Self::discovery_for`] with every pending document loaded.
    pub async fn discover(&self, peer: &Peer) -> ProfileDiscovery {
        let discovery = self.discovery_for(peer, DiscoveryConfig::default());
        discovery.run_until_idle().await;
        discovery
    }
}
