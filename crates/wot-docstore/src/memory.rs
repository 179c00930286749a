//! In-memory document store.
//!
//! Every handle keeps its snapshot behind a lock and dispatches change
//! notifications after the lock is released. Per-URL availability can be
//! switched to simulate peers that are offline or never answer.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::{Arc, RwLock};
use uuid::Uuid;
use wot_core::{ChangeNotifier, SubscriptionId};

use crate::error::DocStoreError;
use crate::store::{ChangeCallback, DocHandle, DocumentStore};

/// URL scheme for documents created by this store.
pub const DOC_URL_PREFIX: &str = "doc:";

/// Simulated reachability of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Online,
    /// `find` fails immediately.
    Offline,
    /// `find` never resolves.
    Stalled,
}

struct MemoryDocHandle {
    url: String,
    state: RwLock<Value>,
    notifier: ChangeNotifier<Value>,
}

impl MemoryDocHandle {
    fn new(url: String, initial: Value) -> Self {
        Self {
            url,
            state: RwLock::new(initial),
            notifier: ChangeNotifier::new(),
        }
    }
}

impl DocHandle for MemoryDocHandle {
    fn url(&self) -> &str {
        &self.url
    }

    fn doc(&self) -> Value {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn change(&self, mutator: &mut dyn FnMut(&mut Value)) -> Result<(), DocStoreError> {
        let snapshot = {
            let mut doc = self
                .state
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            mutator(&mut doc);
            doc.clone()
        };
        self.notifier.notify(&snapshot);
        Ok(())
    }

    fn on_change(&self, callback: ChangeCallback) -> SubscriptionId {
        self.notifier.subscribe(callback)
    }

    fn off_change(&self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }
}

/// Thread-safe in-memory [`DocumentStore`].
#[derive(Default)]
pub struct MemoryDocumentStore {
    docs: DashMap<String, Arc<MemoryDocHandle>>,
    availability: DashMap<String, Availability>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a document under a known URL (e.g. from a snapshot).
    ///
    /// Replacing an existing document goes through its handle so that
    /// subscribers observe the change.
    pub fn insert(&self, url: &str, doc: Value) {
        if let Some(existing) = self.docs.get(url).map(|h| Arc::clone(h.value())) {
            let mut replacement = Some(doc);
            let _ = existing.change(&mut |current| {
                if let Some(next) = replacement.take() {
                    *current = next;
                }
            });
            return;
        }
        self.docs.insert(
            url.to_string(),
            Arc::new(MemoryDocHandle::new(url.to_string(), doc)),
        );
    }

    pub fn set_availability(&self, url: &str, availability: Availability) {
        tracing::debug!(url = url, ?availability, "document availability changed");
        self.availability.insert(url.to_string(), availability);
    }

    pub fn availability(&self, url: &str) -> Availability {
        self.availability
            .get(url)
            .map(|a| *a.value())
            .unwrap_or(Availability::Online)
    }

    /// Synchronous access to a locally held document, regardless of availability.
    pub fn local(&self, url: &str) -> Option<Arc<dyn DocHandle>> {
        self.docs
            .get(url)
            .map(|h| Arc::clone(h.value()) as Arc<dyn DocHandle>)
    }

    /// Copy of every document, sorted by URL.
    pub fn snapshot(&self) -> Vec<(String, Value)> {
        let mut all: Vec<(String, Value)> = self
            .docs
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().doc()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn find(&self, url: &str) -> Result<Arc<dyn DocHandle>, DocStoreError> {
        match self.availability(url) {
            Availability::Online => {}
            Availability::Offline => return Err(DocStoreError::Unavailable(url.to_string())),
            Availability::Stalled => {
                futures::future::pending::<()>().await;
                return Err(DocStoreError::Unavailable(url.to_string()));
            }
        }
        self.local(url)
            .ok_or_else(|| DocStoreError::NotFound(url.to_string()))
    }

    async fn create(&self, initial: Value) -> Result<Arc<dyn DocHandle>, DocStoreError> {
        let url = format!("{}{}", DOC_URL_PREFIX, Uuid::now_v7().simple());
        let handle = Arc::new(MemoryDocHandle::new(url.clone(), initial));
        self.docs.insert(url.clone(), Arc::clone(&handle));
        tracing::debug!(url = %url, "document created");
        Ok(handle as Arc<dyn DocHandle>)
    }
}
