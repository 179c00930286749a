use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use wot_core::SubscriptionId;

use crate::error::DocStoreError;

/// Callback invoked with the new snapshot after every change to a document.
pub type ChangeCallback = Box<dyn Fn(&Value) + Send + Sync>;

/// Persists and syncs arbitrary keyed documents.
///
/// Remote documents may be unavailable or may never resolve while their
/// owner is offline; callers must bound `find` with a timeout.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Locate a document by URL.
    async fn find(&self, url: &str) -> Result<Arc<dyn DocHandle>, DocStoreError>;

    /// Create a new document with the given initial content.
    async fn create(&self, initial: Value) -> Result<Arc<dyn DocHandle>, DocStoreError>;
}

/// Live handle to one document.
pub trait DocHandle: Send + Sync {
    fn url(&self) -> &str;

    /// Current snapshot.
    fn doc(&self) -> Value;

    /// Apply a local mutation and notify change subscribers.
    fn change(&self, mutator: &mut dyn FnMut(&mut Value)) -> Result<(), DocStoreError>;

    fn on_change(&self, callback: ChangeCallback) -> SubscriptionId;

    fn off_change(&self, id: SubscriptionId) -> bool;
}
