use async_trait::async_trait;
use std::sync::Arc;
use wot_attestation::UserDocument;
use wot_docstore::DocumentStore;

use crate::error::DiscoveryError;

/// Fetches a peer's personal document by URL.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    async fn load(&self, url: &str) -> Result<UserDocument, DiscoveryError>;
}

/// Loads documents through a [`DocumentStore`].
pub struct StoreDocumentLoader {
    documents: Arc<dyn DocumentStore>,
}

impl StoreDocumentLoader {
    pub fn new(documents: Arc<dyn DocumentStore>) -> Self {
        Self { documents }
    }
}

#[async_trait]
impl DocumentLoader for StoreDocumentLoader {
    async fn load(&self, url: &str) -> Result<UserDocument, DiscoveryError> {
        let handle = self.documents.find(url).await?;
        Ok(UserDocument::from_value(&handle.doc())?)
    }
}
