//! An opened local identity with its documents.

use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use wot_attestation::{TrustStore, WorkspaceDocument};
use wot_crypto::Identity;
use wot_discovery::{ProfileDiscovery, StoreDocumentLoader};
use wot_docstore::MemoryDocumentStore;

use crate::config::WotConfig;
use crate::storage::Storage;

pub struct Session {
    config: WotConfig,
    storage: Storage,
    documents: Arc<MemoryDocumentStore>,
    trust: TrustStore,
}

impl Session {
    /// Open the identity stored under the configured data directory.
    pub fn open(config: &WotConfig) -> Result<Self> {
        let storage = Storage::open(&config.db_path())?;
        let (secret, doc_url) = storage
            .load_identity()?
            .ok_or_else(|| anyhow!("no identity found; run `wot init` first"))?;
        let documents = Arc::new(MemoryDocumentStore::new());
        storage.load_into(&documents)?;

        let identity = Arc::new(Identity::from_secret_bytes(&secret)?);
        let handle = documents
            .local(&doc_url)
            .with_context(|| format!("personal document {doc_url} is missing"))?;
        let trust = TrustStore::open(identity, handle, documents.clone())?
            .with_propagation_timeout(config.discovery.load_timeout());

        Ok(Self {
            config: config.clone(),
            storage,
            documents,
            trust,
        })
    }

    /// Generate a fresh identity and personal document, replacing any
    /// stored identity.
    pub async fn create(config: &WotConfig) -> Result<Self> {
        let storage = Storage::open(&config.db_path())?;
        let documents = Arc::new(MemoryDocumentStore::new());
        storage.load_into(&documents)?;

        let identity = Arc::new(wot_crypto::generate_identity());
        let secret = identity
            .keypair()
            .map(|k| k.secret_bytes())
            .ok_or_else(|| anyhow!("generated identity has no secret key"))?;
        let trust = TrustStore::create(identity, documents.clone())
            .await?
            .with_propagation_timeout(config.discovery.load_timeout());
        storage.put_identity(&secret, trust.doc_url())?;

        let session = Self {
            config: config.clone(),
            storage,
            documents,
            trust,
        };
        session.persist()?;
        Ok(session)
    }

    pub fn trust(&self) -> &TrustStore {
        &self.trust
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Write every in-memory document back to disk.
    pub fn persist(&self) -> Result<()> {
        self.storage.save_from(&self.documents)?;
        Ok(())
    }

    /// Run discovery over everything known locally: own profile, trust
    /// relationships, scanned contacts and workspace documents.
    pub async fn discover(&self) -> Result<ProfileDiscovery> {
        let loader = Arc::new(StoreDocumentLoader::new(self.documents.clone()));
        let discovery = ProfileDiscovery::new(self.trust.did(), loader, self.config.discovery.clone());

        discovery.update_self_profile(&self.trust.document(), Some(self.trust.doc_url()))?;
        discovery.sync_trust(&self.trust.trust_given(), &self.trust.trust_received());
        for contact in self.storage.contacts()? {
            if let Err(e) = discovery.register_payload(&contact) {
                tracing::warn!(url = %contact.user_doc_url, error = %e, "skipping stored contact");
            }
        }
        discovery.run_until_idle().await;

        for (url, doc) in self.documents.snapshot() {
            if doc.get("did").is_some() || doc.get("identities").is_none() {
                continue;
            }
            match WorkspaceDocument::from_value(&doc) {
                Ok(workspace) => {
                    discovery.apply_workspace(&workspace);
                }
                Err(e) => tracing::warn!(url = %url, error = %e, "unreadable workspace document"),
            }
        }
        Ok(discovery)
    }
}
