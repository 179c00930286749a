use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::join_all;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};
use wot_attestation::{TrustAttestation, UserDocument, WorkspaceDocument};
use wot_core::{
    ChangeNotifier, DiscoveryConfig, DiscoverySource, LoadState, SignatureStatus, SubscriptionId,
};
use wot_crypto::is_valid_did;

use crate::error::DiscoveryError;
use crate::events::DiscoveryEvent;
use crate::loader::DocumentLoader;
use crate::payload::DiscoveryPayload;
use crate::profile::{merge_profile, MergeOutcome, TrackedProfile};
use crate::registry::{DocUrlEntry, DocUrlRegistry, RegisterOutcome};

/// Registry state mutated between awaits.
#[derive(Default)]
struct EngineState {
    registry: DocUrlRegistry,
    /// URLs dispatched in the current epoch.
    attempted: HashSet<String>,
    in_flight: HashSet<String>,
    /// Loaded peer documents by URL.
    documents: HashMap<String, UserDocument>,
}

/// Discovers, loads and merges the profiles visible to one local identity.
///
/// Lock order is `state` then `profiles`; events are dispatched only after
/// both are released so subscribers may read back into the engine.
pub struct ProfileDiscovery {
    self_did: String,
    config: DiscoveryConfig,
    loader: Arc<dyn DocumentLoader>,
    profiles: DashMap<String, TrackedProfile>,
    state: Mutex<EngineState>,
    epoch: AtomicU64,
    events: ChangeNotifier<DiscoveryEvent>,
}

impl ProfileDiscovery {
    pub fn new(self_did: &str, loader: Arc<dyn DocumentLoader>, config: DiscoveryConfig) -> Self {
        Self {
            self_did: self_did.to_string(),
            config,
            loader,
            profiles: DashMap::new(),
            state: Mutex::new(EngineState::default()),
            epoch: AtomicU64::new(0),
            events: ChangeNotifier::new(),
        }
    }

    pub fn self_did(&self) -> &str {
        &self.self_did
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    fn state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit(&self, events: Vec<DiscoveryEvent>) {
        for event in &events {
            self.events.notify(event);
        }
    }

    fn merge(&self, incoming: TrackedProfile, force: bool, events: &mut Vec<DiscoveryEvent>) -> MergeOutcome {
        let did = incoming.did.clone();
        let outcome = match self.profiles.entry(did.clone()) {
            Entry::Occupied(mut slot) => {
                let outcome = merge_profile(Some(slot.get()), incoming, force);
                if let Some(merged) = outcome.profile() {
                    slot.insert(merged.clone());
                }
                outcome
            }
            Entry::Vacant(slot) => {
                let outcome = merge_profile(None, incoming, force);
                if let Some(merged) = outcome.profile() {
                    slot.insert(merged.clone());
                }
                outcome
            }
        };
        if let Some(merged) = outcome.profile() {
            debug!(did = %did, source = %merged.discovery_source, force, "profile merged");
            events.push(DiscoveryEvent::ProfileUpdated {
                did,
                source: merged.discovery_source,
            });
        }
        outcome
    }

    /// Merge `incoming` into the profile tracked for `incoming.did`.
    pub fn update_profile(&self, incoming: TrackedProfile, force: bool) -> MergeOutcome {
        let mut events = Vec::new();
        let outcome = self.merge(incoming, force, &mut events);
        self.emit(events);
        outcome
    }

    /// Publish the local user's own profile. Always wins.
    pub fn update_self_profile(
        &self,
        document: &UserDocument,
        doc_url: Option<&str>,
    ) -> Result<MergeOutcome, DiscoveryError> {
        if document.did != self.self_did {
            return Err(DiscoveryError::ForeignDocument {
                expected: self.self_did.clone(),
                found: document.did.clone(),
            });
        }
        let status = document.profile_signature_status();
        if status == SignatureStatus::Invalid {
            warn!(did = %document.did, "own profile signature is invalid");
        }
        let incoming = profile_from_document(
            document,
            DiscoverySource::SelfProfile,
            doc_url.map(str::to_string),
            status,
        );
        Ok(self.update_profile(incoming, true))
    }

    /// Reconcile 1st-degree tracking with the local trust maps.
    ///
    /// Every counterpart gets a profile at the trust source and, when its
    /// document URL is known, a registry entry. Weaker entries for the same
    /// DID under other URLs are dropped. Counterparts that disappeared since
    /// the last sync are demoted to their strongest remaining source, or
    /// evicted.
    pub fn sync_trust(
        &self,
        given: &BTreeMap<String, TrustAttestation>,
        received: &BTreeMap<String, TrustAttestation>,
    ) {
        let mut wanted: BTreeMap<String, (DiscoverySource, Option<String>)> = BTreeMap::new();
        for (did, attestation) in given {
            wanted.insert(
                did.clone(),
                (DiscoverySource::TrustGiven, attestation.trustee_doc_url.clone()),
            );
        }
        for (did, attestation) in received {
            let slot = wanted
                .entry(did.clone())
                .or_insert((DiscoverySource::TrustReceived, None));
            if slot.1.is_none() {
                slot.1 = attestation.trustor_doc_url.clone();
            }
        }
        wanted.remove(&self.self_did);

        let mut events = Vec::new();
        {
            let mut state = self.state();

            let mut upgraded = Vec::new();
            for (did, (source, url)) in &wanted {
                if let Some(url) = url {
                    let outcome = state.registry.register(url, Some(did.as_str()), *source, false);
                    if matches!(outcome, RegisterOutcome::Inserted | RegisterOutcome::Upgraded) {
                        events.push(DiscoveryEvent::EntryRegistered {
                            url: url.clone(),
                            source: *source,
                        });
                    }
                    // Already loaded at a weaker source: it will not be fetched again.
                    if outcome == RegisterOutcome::Upgraded {
                        upgraded.extend(state.documents.get(url).cloned());
                    }
                }
                for superseded in state.registry.entries_for_did(did) {
                    if Some(&superseded.url) != url.as_ref() && !superseded.discovery_source.is_first_degree() {
                        debug!(did = %did, url = %superseded.url, "dropping entry superseded by trust");
                        forget_entry(&mut state, &superseded.url);
                    }
                }
                self.promote(did, *source, url.as_deref(), &mut events);
            }
            for document in &upgraded {
                debug!(did = %document.did, "crawling document upgraded to first degree");
                self.crawl_second_degree(&mut state, document, &mut events);
            }

            let revoked: Vec<DocUrlEntry> = state
                .registry
                .snapshot()
                .into_iter()
                .filter(|e| {
                    e.discovery_source.is_first_degree()
                        && e.expected_did.as_ref().map_or(true, |did| !wanted.contains_key(did))
                })
                .collect();
            for entry in &revoked {
                forget_entry(&mut state, &entry.url);
            }

            let orphaned: Vec<String> = self
                .profiles
                .iter()
                .filter(|p| p.discovery_source.is_first_degree() && !wanted.contains_key(p.key()))
                .map(|p| p.key().clone())
                .collect();
            for did in orphaned {
                self.demote(&state, &did, &mut events);
            }
        }
        self.emit(events);
    }

    fn promote(&self, did: &str, source: DiscoverySource, url: Option<&str>, events: &mut Vec<DiscoveryEvent>) {
        let existing = self.profiles.get(did).map(|p| p.value().clone());
        match existing {
            None => {
                let load_state = if url.is_some() {
                    LoadState::Loading
                } else {
                    LoadState::Unavailable
                };
                let placeholder = TrackedProfile::placeholder(did, source, load_state)
                    .with_doc_url(url.map(str::to_string));
                self.merge(placeholder, false, events);
            }
            Some(current) if current.priority() < source.priority() => {
                let user_doc_url = url.map(str::to_string).or_else(|| current.user_doc_url.clone());
                let promoted = TrackedProfile {
                    discovery_source: source,
                    user_doc_url,
                    ..current
                };
                self.merge(promoted, false, events);
            }
            Some(_) => {}
        }
    }

    fn demote(&self, state: &EngineState, did: &str, events: &mut Vec<DiscoveryEvent>) {
        let fallback = state
            .registry
            .entries_for_did(did)
            .into_iter()
            .max_by_key(|e| (e.discovery_source.priority(), e.sequence));
        match fallback {
            Some(entry) => {
                if let Some(mut profile) = self.profiles.get_mut(did) {
                    profile.discovery_source = entry.discovery_source;
                    profile.user_doc_url = Some(entry.url.clone());
                }
                info!(did = %did, source = %entry.discovery_source, "trust removed, profile demoted");
                events.push(DiscoveryEvent::ProfileUpdated {
                    did: did.to_string(),
                    source: entry.discovery_source,
                });
            }
            None => {
                self.profiles.remove(did);
                info!(did = %did, "trust removed, profile evicted");
                events.push(DiscoveryEvent::ProfileEvicted { did: did.to_string() });
            }
        }
    }

    /// Track a document learned out of band.
    ///
    /// Idempotent by URL. With both `expected_did` and `display_name`, a
    /// loading placeholder is shown until the document arrives, unless a
    /// stronger profile already exists. Re-registering an unavailable URL
    /// schedules one more attempt. A new URL for a DID that is already
    /// trusted, or for the local identity, is ignored.
    pub fn register_external_doc(
        &self,
        url: &str,
        expected_did: Option<&str>,
        display_name: Option<&str>,
    ) -> Result<RegisterOutcome, DiscoveryError> {
        if url.trim().is_empty() {
            return Err(DiscoveryError::InvalidPayload("empty document URL".into()));
        }
        if let Some(did) = expected_did {
            if !is_valid_did(did) {
                return Err(DiscoveryError::InvalidDid(did.to_string()));
            }
        }

        let mut events = Vec::new();
        let outcome = {
            let mut state = self.state();
            if let Some(did) = expected_did {
                let trusted = did == self.self_did
                    || state
                        .registry
                        .entries_for_did(did)
                        .iter()
                        .any(|e| e.discovery_source.is_first_degree())
                    || self
                        .profiles
                        .get(did)
                        .is_some_and(|p| p.discovery_source.is_first_degree());
                if trusted && !state.registry.contains(url) {
                    debug!(url = %url, did = %did, "already tracked at first degree, ignoring external document");
                    return Ok(RegisterOutcome::Unchanged);
                }
            }
            let outcome = state
                .registry
                .register(url, expected_did, DiscoverySource::External, true);
            match outcome {
                RegisterOutcome::Inserted => events.push(DiscoveryEvent::EntryRegistered {
                    url: url.to_string(),
                    source: DiscoverySource::External,
                }),
                RegisterOutcome::Retried => {
                    state.attempted.remove(url);
                    if let Some(did) = expected_did {
                        if let Some(mut profile) = self.profiles.get_mut(did) {
                            if profile.load_state == LoadState::Unavailable
                                && profile.user_doc_url.as_deref() == Some(url)
                            {
                                profile.load_state = LoadState::Loading;
                            }
                        }
                    }
                }
                RegisterOutcome::Upgraded | RegisterOutcome::Unchanged => {}
            }

            if let (Some(did), Some(name)) = (expected_did, display_name) {
                let weaker = self
                    .profiles
                    .get(did)
                    .map_or(true, |p| p.priority() < DiscoverySource::External.priority());
                if did != self.self_did && weaker {
                    let placeholder =
                        TrackedProfile::placeholder(did, DiscoverySource::External, LoadState::Loading)
                            .with_display(Some(name.to_string()), None)
                            .with_doc_url(Some(url.to_string()));
                    self.merge(placeholder, false, &mut events);
                }
            }
            outcome
        };
        info!(url = %url, expected_did = ?expected_did, ?outcome, "external document registered");
        self.emit(events);
        Ok(outcome)
    }

    /// [`Self::register_external_doc`] for a scanned payload.
    pub fn register_payload(&self, payload: &DiscoveryPayload) -> Result<RegisterOutcome, DiscoveryError> {
        payload.validate()?;
        self.register_external_doc(
            &payload.user_doc_url,
            Some(&payload.did),
            payload.display_name.as_deref(),
        )
    }

    /// Fall back to workspace identities for DIDs nothing else knows.
    /// Returns the number of profiles added.
    pub fn apply_workspace(&self, workspace: &WorkspaceDocument) -> usize {
        let mut events = Vec::new();
        let mut added = 0;
        for (did, identity) in &workspace.identities {
            if did == &self.self_did || self.profiles.contains_key(did) {
                continue;
            }
            if !is_valid_did(did) {
                debug!(did = %did, "skipping malformed workspace identity");
                continue;
            }
            let mut profile = TrackedProfile::placeholder(did, DiscoverySource::Workspace, LoadState::Loaded)
                .with_display(identity.display_name.clone(), identity.avatar_url.clone());
            profile.signature_status = SignatureStatus::Missing;
            if self.merge(profile, false, &mut events).is_changed() {
                added += 1;
            }
        }
        self.emit(events);
        added
    }

    /// Fetch every registered document that is loading and not yet tried.
    /// Returns how many loads were dispatched.
    pub async fn load_pending(&self) -> usize {
        let epoch = self.epoch.load(Ordering::SeqCst);
        let batch: Vec<String> = {
            let mut state = self.state();
            let EngineState {
                registry,
                attempted,
                in_flight,
                ..
            } = &mut *state;
            let urls: Vec<String> = registry
                .loading()
                .into_iter()
                .map(|e| e.url)
                .filter(|url| !attempted.contains(url) && !in_flight.contains(url))
                .collect();
            for url in &urls {
                attempted.insert(url.clone());
                in_flight.insert(url.clone());
            }
            urls
        };
        if batch.is_empty() {
            return 0;
        }

        debug!(count = batch.len(), epoch, "dispatching document loads");
        let timeout = self.config.load_timeout();
        let loads = batch.iter().map(|url| {
            let loader = Arc::clone(&self.loader);
            async move {
                let result = match tokio::time::timeout(timeout, loader.load(url)).await {
                    Ok(result) => result,
                    Err(_) => Err(DiscoveryError::Timeout(url.clone())),
                };
                (url, result)
            }
        });
        let results = join_all(loads).await;

        for (url, result) in results {
            if self.epoch.load(Ordering::SeqCst) != epoch {
                debug!(url = %url, epoch, "dropping load result from a torn down epoch");
                continue;
            }
            self.state().in_flight.remove(url);
            match result {
                Ok(document) => {
                    self.on_loaded(url, document);
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "document unavailable");
                    self.on_unavailable(url);
                }
            }
        }
        batch.len()
    }

    /// Load until nothing is left to dispatch.
    pub async fn run_until_idle(&self) {
        while self.load_pending().await > 0 {}
    }

    /// Apply a loaded document. Returns `false` if `url` is no longer tracked.
    pub fn on_loaded(&self, url: &str, document: UserDocument) -> bool {
        let mut events = Vec::new();
        {
            let mut state = self.state();
            let Some(entry) = state.registry.get(url).cloned() else {
                debug!(url = %url, "ignoring document for untracked url");
                return false;
            };
            state.registry.set_load_state(url, LoadState::Loaded);

            if let Some(expected) = entry.expected_did.as_deref() {
                if expected != document.did {
                    warn!(url = %url, expected = %expected, found = %document.did, "document belongs to another DID");
                    if let Some(mut profile) = self.profiles.get_mut(expected) {
                        profile.signature_status = SignatureStatus::Invalid;
                        if profile.user_doc_url.as_deref() == Some(url) {
                            profile.load_state = LoadState::Loaded;
                        }
                        events.push(DiscoveryEvent::ProfileUpdated {
                            did: expected.to_string(),
                            source: profile.discovery_source,
                        });
                    }
                    drop(state);
                    self.emit(events);
                    return true;
                }
            }

            if document.did == self.self_did {
                debug!(url = %url, "skipping own document reached through a peer");
                return true;
            }

            let status = document.profile_signature_status();
            if status == SignatureStatus::Invalid {
                warn!(did = %document.did, url = %url, "profile signature is invalid");
            }
            let mut incoming =
                profile_from_document(&document, entry.discovery_source, Some(url.to_string()), status);
            incoming.registered_at = entry.registered_at;
            self.merge(incoming, false, &mut events);

            if entry.discovery_source.is_first_degree() {
                self.crawl_second_degree(&mut state, &document, &mut events);
            }
            state.documents.insert(url.to_string(), document);
        }
        self.emit(events);
        true
    }

    /// Mark a document that failed to load. Placeholders stay.
    pub fn on_unavailable(&self, url: &str) -> bool {
        let mut events = Vec::new();
        {
            let mut state = self.state();
            let Some(entry) = state.registry.get(url).cloned() else {
                return false;
            };
            state.registry.set_load_state(url, LoadState::Unavailable);
            events.push(DiscoveryEvent::EntryUnavailable { url: url.to_string() });

            if let Some(did) = entry.expected_did.as_deref() {
                if let Some(mut profile) = self.profiles.get_mut(did) {
                    if profile.load_state == LoadState::Loading && profile.user_doc_url.as_deref() == Some(url) {
                        profile.load_state = LoadState::Unavailable;
                        events.push(DiscoveryEvent::ProfileUpdated {
                            did: did.to_string(),
                            source: profile.discovery_source,
                        });
                    }
                }
            }
        }
        self.emit(events);
        true
    }

    fn crawl_second_degree(&self, state: &mut EngineState, peer: &UserDocument, events: &mut Vec<DiscoveryEvent>) {
        let mut candidates: Vec<(String, Option<String>)> = Vec::new();
        for attestation in peer.attestations_given().into_values() {
            candidates.push((attestation.trustee_id, attestation.trustee_doc_url));
        }
        for attestation in peer.attestations_received().into_values() {
            candidates.push((attestation.trustor_id, attestation.trustor_doc_url));
        }

        let mut added = 0usize;
        for (did, url) in candidates {
            if did == self.self_did || did == peer.did || self.profiles.contains_key(&did) {
                continue;
            }
            let Some(url) = url else {
                debug!(did = %did, via = %peer.did, "second-degree DID has no document URL");
                continue;
            };
            if state.registry.knows_did(&did) || state.registry.contains(&url) {
                continue;
            }
            state
                .registry
                .register(&url, Some(did.as_str()), DiscoverySource::Network2nd, false);
            events.push(DiscoveryEvent::EntryRegistered {
                url,
                source: DiscoverySource::Network2nd,
            });
            added += 1;
        }

        let evicted = state
            .registry
            .enforce_second_degree_cap(self.config.max_second_degree);
        for entry in &evicted {
            state.documents.remove(&entry.url);
            state.attempted.remove(&entry.url);
            let Some(did) = entry.expected_did.as_deref() else {
                continue;
            };
            let second_degree = self.profiles.get(did).is_some_and(|p| p.is_second_degree());
            if second_degree && !state.registry.knows_did(did) {
                self.profiles.remove(did);
                events.push(DiscoveryEvent::ProfileEvicted { did: did.to_string() });
            }
        }
        debug!(via = %peer.did, added, evicted = evicted.len(), "second-degree crawl");
    }

    pub fn profile(&self, did: &str) -> Option<TrackedProfile> {
        self.profiles.get(did).map(|p| p.value().clone())
    }

    /// Every tracked profile, ordered by DID.
    pub fn profiles(&self) -> Vec<TrackedProfile> {
        let mut all: Vec<TrackedProfile> = self.profiles.iter().map(|p| p.value().clone()).collect();
        all.sort_by(|a, b| a.did.cmp(&b.did));
        all
    }

    /// Every registry entry, in registration order.
    pub fn entries(&self) -> Vec<DocUrlEntry> {
        self.state().registry.snapshot()
    }

    pub fn entry(&self, url: &str) -> Option<DocUrlEntry> {
        self.state().registry.get(url).cloned()
    }

    pub fn second_degree_count(&self) -> usize {
        self.profiles.iter().filter(|p| p.is_second_degree()).count()
    }

    /// True while any 1st-degree document is still loading.
    pub fn is_loading(&self) -> bool {
        self.state()
            .registry
            .loading()
            .iter()
            .any(|e| e.discovery_source.is_first_degree())
    }

    /// The most recently loaded document for `did`, if any.
    pub fn loaded_document(&self, did: &str) -> Option<UserDocument> {
        let state = self.state();
        let found = state
            .registry
            .entries_for_did(did)
            .iter()
            .rev()
            .find_map(|e| state.documents.get(&e.url).cloned())
            .or_else(|| state.documents.values().find(|d| d.did == did).cloned());
        found
    }

    /// Loaded documents of 1st-degree peers, keyed by DID.
    pub fn peer_documents(&self) -> BTreeMap<String, UserDocument> {
        let state = self.state();
        let peers = state
            .documents
            .iter()
            .filter(|(url, _)| {
                state
                    .registry
                    .get(url)
                    .is_some_and(|e| e.discovery_source.is_first_degree())
            })
            .map(|(_, doc)| (doc.did.clone(), doc.clone()))
            .collect();
        peers
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&DiscoveryEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Stop applying results of loads already in flight and forget which
    /// URLs were attempted. Subscribers are dropped.
    pub fn teardown(&self) {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state();
            state.in_flight.clear();
            state.attempted.clear();
        }
        self.events.clear();
        debug!(did = %self.self_did, epoch, "discovery torn down");
    }
}

fn forget_entry(state: &mut EngineState, url: &str) {
    state.registry.remove(url);
    state.documents.remove(url);
    state.attempted.remove(url);
}

fn profile_from_document(
    document: &UserDocument,
    source: DiscoverySource,
    doc_url: Option<String>,
    status: SignatureStatus,
) -> TrackedProfile {
    let section = document.profile.as_ref();
    let mut profile = TrackedProfile::placeholder(&document.did, source, LoadState::Loaded)
        .with_display(
            section.and_then(|p| p.display_name.clone()),
            section.and_then(|p| p.avatar_url.clone()),
        )
        .with_doc_url(doc_url);
    profile.signature_status = status;
    profile.last_updated = section.map(|p| p.updated_at).unwrap_or_default();
    profile
}
