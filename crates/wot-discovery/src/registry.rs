use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use wot_core::{DiscoverySource, LoadState};

/// A document the engine intends to fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocUrlEntry {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_did: Option<String>,
    pub discovery_source: DiscoverySource,
    pub load_state: LoadState,
    pub registered_at: DateTime<Utc>,
    /// Registration order; breaks wall-clock ties for FIFO eviction.
    pub sequence: u64,
}

/// What [`DocUrlRegistry::register`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    Inserted,
    /// Already tracked at a weaker source; the source was raised.
    Upgraded,
    /// Was `Unavailable` and got reset to `Loading`.
    Retried,
    Unchanged,
}

/// Document URLs keyed by URL.
#[derive(Debug, Default)]
pub struct DocUrlRegistry {
    entries: HashMap<String, DocUrlEntry>,
    next_sequence: u64,
}

impl DocUrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `url`. Idempotent: a URL is tracked at most once, at the
    /// strongest source it was registered with. `retry_unavailable` resets an
    /// `Unavailable` entry to `Loading`.
    pub fn register(
        &mut self,
        url: &str,
        expected_did: Option<&str>,
        source: DiscoverySource,
        retry_unavailable: bool,
    ) -> RegisterOutcome {
        if let Some(entry) = self.entries.get_mut(url) {
            let mut outcome = RegisterOutcome::Unchanged;
            if entry.expected_did.is_none() {
                entry.expected_did = expected_did.map(str::to_string);
            }
            if source.priority() > entry.discovery_source.priority() {
                entry.discovery_source = source;
                outcome = RegisterOutcome::Upgraded;
            }
            if retry_unavailable && entry.load_state == LoadState::Unavailable {
                entry.load_state = LoadState::Loading;
                outcome = RegisterOutcome::Retried;
            }
            return outcome;
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.entries.insert(
            url.to_string(),
            DocUrlEntry {
                url: url.to_string(),
                expected_did: expected_did.map(str::to_string),
                discovery_source: source,
                load_state: LoadState::Loading,
                registered_at: Utc::now(),
                sequence,
            },
        );
        RegisterOutcome::Inserted
    }

    pub fn get(&self, url: &str) -> Option<&DocUrlEntry> {
        self.entries.get(url)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains_key(url)
    }

    pub fn remove(&mut self, url: &str) -> Option<DocUrlEntry> {
        self.entries.remove(url)
    }

    pub fn set_load_state(&mut self, url: &str, state: LoadState) -> bool {
        match self.entries.get_mut(url) {
            Some(entry) => {
                entry.load_state = state;
                true
            }
            None => false,
        }
    }

    /// Entries expected to hold `did`'s document.
    pub fn entries_for_did(&self, did: &str) -> Vec<DocUrlEntry> {
        let mut found: Vec<DocUrlEntry> = self
            .entries
            .values()
            .filter(|e| e.expected_did.as_deref() == Some(did))
            .cloned()
            .collect();
        found.sort_by_key(|e| e.sequence);
        found
    }

    pub fn knows_did(&self, did: &str) -> bool {
        self.entries.values().any(|e| e.expected_did.as_deref() == Some(did))
    }

    /// Entries still `Loading`, in registration order.
    pub fn loading(&self) -> Vec<DocUrlEntry> {
        let mut found: Vec<DocUrlEntry> = self
            .entries
            .values()
            .filter(|e| e.load_state == LoadState::Loading)
            .cloned()
            .collect();
        found.sort_by_key(|e| e.sequence);
        found
    }

    pub fn count_by_source(&self, source: DiscoverySource) -> usize {
        self.entries.values().filter(|e| e.discovery_source == source).count()
    }

    /// Drop the oldest `Network2nd` entries until at most `cap` remain.
    pub fn enforce_second_degree_cap(&mut self, cap: usize) -> Vec<DocUrlEntry> {
        let mut second: Vec<(u64, String)> = self
            .entries
            .values()
            .filter(|e| e.discovery_source == DiscoverySource::Network2nd)
            .map(|e| (e.sequence, e.url.clone()))
            .collect();
        if second.len() <= cap {
            return Vec::new();
        }
        second.sort();
        let excess = second.len() - cap;
        second
            .into_iter()
            .take(excess)
            .filter_map(|(_, url)| self.entries.remove(&url))
            .collect()
    }

    /// All entries in registration order.
    pub fn snapshot(&self) -> Vec<DocUrlEntry> {
        let mut all: Vec<DocUrlEntry> = self.entries.values().cloned().collect();
        all.sort_by_key(|e| e.sequence);
        all
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
