use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use wot_core::{ChangeNotifier, SignatureStatus, SubscriptionId, TrustLevel};
use wot_crypto::{did_to_public_key, Identity};
use wot_docstore::{DocHandle, DocStoreError, DocumentStore};

use crate::attestation::{AttestationRecord, TrustAttestation};
use crate::document::{ProfileSection, UserDocument, TRUST_GIVEN, TRUST_RECEIVED};
use crate::error::AttestationError;

const DEFAULT_PROPAGATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of [`TrustStore::set_trust`].
#[derive(Debug, Clone)]
pub struct TrustOutcome {
    pub attestation: TrustAttestation,
    /// Whether the copy reached the trustee's document.
    pub propagated: bool,
}

/// Per-identity attestation store backed by the user's personal document.
///
/// The local `trustGiven` map is authoritative for the user's own trust
/// decisions; writes into peers' `trustReceived` maps are best-effort.
pub struct TrustStore {
    identity: Arc<Identity>,
    handle: Arc<dyn DocHandle>,
    documents: Arc<dyn DocumentStore>,
    notifier: Arc<ChangeNotifier<UserDocument>>,
    handle_subscription: SubscriptionId,
    propagation_timeout: Duration,
}

impl TrustStore {
    /// Create a fresh personal document for `identity`.
    pub async fn create(
        identity: Arc<Identity>,
        documents: Arc<dyn DocumentStore>,
    ) -> Result<Self, AttestationError> {
        let initial = UserDocument::new(identity.did()).to_value()?;
        let handle = documents.create(initial).await?;
        tracing::info!(did = %identity.did(), url = %handle.url(), "personal document created");
        Self::open(identity, handle, documents)
    }

    /// Attach to an existing personal document.
    ///
    /// An empty document is initialized for `identity`; a document owned by
    /// another DID is rejected.
    pub fn open(
        identity: Arc<Identity>,
        handle: Arc<dyn DocHandle>,
        documents: Arc<dyn DocumentStore>,
    ) -> Result<Self, AttestationError> {
        let current = handle.doc();
        let is_empty = current.is_null() || current.as_object().is_some_and(|o| o.is_empty());
        if is_empty {
            let initial = UserDocument::new(identity.did()).to_value()?;
            let mut init = Some(initial);
            handle.change(&mut |doc| {
                if let Some(value) = init.take() {
                    *doc = value;
                }
            })?;
        } else {
            let doc = UserDocument::from_value(&current)?;
            if doc.did != identity.did() {
                return Err(AttestationError::DocumentOwnerMismatch {
                    expected: identity.did().to_string(),
                    found: doc.did,
                });
            }
        }

        let notifier: Arc<ChangeNotifier<UserDocument>> = Arc::new(ChangeNotifier::new());
        let forward = Arc::clone(&notifier);
        let url = handle.url().to_string();
        let handle_subscription = handle.on_change(Box::new(move |value: &Value| {
            match UserDocument::from_value(value) {
                Ok(doc) => forward.notify(&doc),
                Err(e) => tracing::warn!(url = %url, error = %e, "ignoring malformed document change"),
            }
        }));

        Ok(Self {
            identity,
            handle,
            documents,
            notifier,
            handle_subscription,
            propagation_timeout: DEFAULT_PROPAGATION_TIMEOUT,
        })
    }

    pub fn with_propagation_timeout(mut self, timeout: Duration) -> Self {
        self.propagation_timeout = timeout;
        self
    }

    pub fn did(&self) -> &str {
        self.identity.did()
    }

    pub fn identity(&self) -> &Arc<Identity> {
        &self.identity
    }

    /// URL of the personal document.
    pub fn doc_url(&self) -> &str {
        self.handle.url()
    }

    /// Current snapshot of the personal document.
    ///
    /// A document that no longer parses reads as empty.
    pub fn document(&self) -> UserDocument {
        UserDocument::from_value(&self.handle.doc()).unwrap_or_else(|e| {
            tracing::warn!(url = %self.handle.url(), error = %e, "personal document unreadable");
            UserDocument::new(self.did())
        })
    }

    /// Attest trust in `trustee_id`, replacing any earlier attestation.
    ///
    /// When the trustee's document URL is known (passed in or remembered
    /// from an earlier attestation) the attestation is also written into
    /// the trustee's `trustReceived`.
    pub async fn set_trust(
        &self,
        trustee_id: &str,
        level: TrustLevel,
        trustee_doc_url: Option<&str>,
    ) -> Result<TrustOutcome, AttestationError> {
        if trustee_id == self.did() {
            return Err(AttestationError::SelfTrust(trustee_id.to_string()));
        }
        did_to_public_key(trustee_id)?;

        let trustee_doc_url = trustee_doc_url
            .map(str::to_string)
            .or_else(|| self.document().known_doc_url(trustee_id));

        let attestation = TrustAttestation::new(self.did(), trustee_id, level)?
            .with_doc_urls(Some(self.doc_url().to_string()), trustee_doc_url.clone())
            .sign(&self.identity)?;

        let record = serde_json::to_value(AttestationRecord::from(attestation.clone()))?;
        self.handle
            .change(&mut |doc| put_entry(doc, TRUST_GIVEN, trustee_id, record.clone()))?;

        tracing::info!(
            trustor = %self.did(),
            trustee = trustee_id,
            level = %level,
            signed = attestation.is_signed(),
            "trust attested"
        );

        let propagated = match &trustee_doc_url {
            Some(url) => match self.propagate(&attestation, url).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(trustee = trustee_id, url = %url, error = %e, "attestation propagation failed");
                    false
                }
            },
            None => false,
        };

        Ok(TrustOutcome {
            attestation,
            propagated,
        })
    }

    /// Return trust to someone who attested trust in us, using the document
    /// URL carried on their attestation.
    pub async fn trust_back(
        &self,
        trustor_id: &str,
        level: TrustLevel,
    ) -> Result<TrustOutcome, AttestationError> {
        let received = self
            .trust_received()
            .remove(trustor_id)
            .ok_or_else(|| AttestationError::NotReceived(trustor_id.to_string()))?;
        self.set_trust(trustor_id, level, received.trustor_doc_url.as_deref())
            .await
    }

    /// Remove the local attestation for `trustee_id`.
    ///
    /// Copies already propagated to the trustee's document are left in place.
    pub fn revoke_trust(&self, trustee_id: &str) -> Result<Option<TrustAttestation>, AttestationError> {
        let existing = self.trust_given().remove(trustee_id);
        if existing.is_none() && !self.document().trust_given.contains_key(trustee_id) {
            return Ok(None);
        }
        self.handle
            .change(&mut |doc| remove_entry(doc, TRUST_GIVEN, trustee_id))?;
        tracing::info!(trustor = %self.did(), trustee = trustee_id, "trust revoked");
        Ok(existing)
    }

    /// Level of our own attestation for `did`, if any.
    pub fn trust_level(&self, did: &str) -> Option<TrustLevel> {
        self.trust_given().get(did).map(|a| a.level)
    }

    pub fn trust_given(&self) -> BTreeMap<String, TrustAttestation> {
        self.document().attestations_given()
    }

    pub fn trust_received(&self) -> BTreeMap<String, TrustAttestation> {
        self.document().attestations_received()
    }

    /// Whether trust exists in both directions between us and `did`.
    pub fn is_mutual(&self, did: &str) -> bool {
        let doc = self.document();
        doc.attestations_given().contains_key(did) && doc.attestations_received().contains_key(did)
    }

    /// Signature status of every incoming attestation.
    pub fn verify_received(&self) -> Vec<(TrustAttestation, SignatureStatus)> {
        self.trust_received()
            .into_values()
            .map(|att| {
                let status = att.signature_status();
                if status == SignatureStatus::Invalid {
                    tracing::warn!(trustor = %att.trustor_id, "received attestation has invalid signature");
                }
                (att, status)
            })
            .collect()
    }

    /// Publish (and sign) the local profile.
    pub fn set_profile(
        &self,
        display_name: Option<String>,
        avatar_url: Option<String>,
    ) -> Result<ProfileSection, AttestationError> {
        let profile = ProfileSection::new(display_name, avatar_url).sign(&self.identity)?;
        let value = serde_json::to_value(&profile)?;
        self.handle.change(&mut |doc| {
            if let Some(obj) = doc.as_object_mut() {
                obj.insert("profile".to_string(), value.clone());
            }
        })?;
        tracing::info!(did = %self.did(), "profile updated");
        Ok(profile)
    }

    /// Register a callback fired with the new snapshot on every document change.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&UserDocument) + Send + Sync + 'static,
    {
        self.notifier.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    async fn propagate(&self, attestation: &TrustAttestation, url: &str) -> Result<(), AttestationError> {
        let handle = tokio::time::timeout(self.propagation_timeout, self.documents.find(url))
            .await
            .map_err(|_| DocStoreError::Unavailable(format!("{} (timed out)", url)))??;

        let peer = UserDocument::from_value(&handle.doc())?;
        if peer.did != attestation.trustee_id {
            return Err(AttestationError::DocumentOwnerMismatch {
                expected: attestation.trustee_id.clone(),
                found: peer.did,
            });
        }

        let record = serde_json::to_value(AttestationRecord::from(attestation.clone()))?;
        let trustor = attestation.trustor_id.clone();
        handle.change(&mut |doc| put_entry(doc, TRUST_RECEIVED, &trustor, record.clone()))?;
        tracing::debug!(trustee = %attestation.trustee_id, url = url, "attestation propagated");
        Ok(())
    }
}

impl Drop for TrustStore {
    fn drop(&mut self) {
        self.handle.off_change(self.handle_subscription);
        self.notifier.clear();
    }
}

fn put_entry(doc: &mut Value, section: &str, key: &str, record: Value) {
    let Some(root) = doc.as_object_mut() else {
        return;
    };
    let map = root
        .entry(section.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !map.is_object() {
        *map = Value::Object(Map::new());
    }
    if let Some(map) = map.as_object_mut() {
        map.insert(key.to_string(), record);
    }
}

fn remove_entry(doc: &mut Value, section: &str, key: &str) {
    if let Some(map) = doc.get_mut(section).and_then(Value::as_object_mut) {
        map.remove(key);
    }
}
