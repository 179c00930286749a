use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wot_core::{DiscoverySource, LoadState, SignatureStatus};

/// The merged view of one identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedProfile {
    pub did: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_doc_url: Option<String>,
    pub discovery_source: DiscoverySource,
    pub signature_status: SignatureStatus,
    /// Freshness of the display fields, as stamped by their author.
    pub last_updated: DateTime<Utc>,
    pub load_state: LoadState,
    pub registered_at: DateTime<Utc>,
}

impl TrackedProfile {
    /// A profile with no content yet. `last_updated` starts at the Unix
    /// epoch so any real document is fresher.
    pub fn placeholder(did: &str, source: DiscoverySource, load_state: LoadState) -> Self {
        Self {
            did: did.to_string(),
            display_name: None,
            avatar_url: None,
            user_doc_url: None,
            discovery_source: source,
            signature_status: SignatureStatus::Pending,
            last_updated: DateTime::<Utc>::default(),
            load_state,
            registered_at: Utc::now(),
        }
    }

    pub fn with_display(mut self, display_name: Option<String>, avatar_url: Option<String>) -> Self {
        self.display_name = display_name;
        self.avatar_url = avatar_url;
        self
    }

    pub fn with_doc_url(mut self, url: Option<String>) -> Self {
        self.user_doc_url = url;
        self
    }

    pub fn priority(&self) -> u8 {
        self.discovery_source.priority()
    }

    pub fn is_second_degree(&self) -> bool {
        self.discovery_source == DiscoverySource::Network2nd
    }
}

/// Result of merging an incoming record into the tracked one.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome {
    Inserted(TrackedProfile),
    /// `force` or equal-or-stronger source: the incoming record won.
    Replaced(TrackedProfile),
    /// Weaker but fresher source: only display fields were taken.
    Refreshed(TrackedProfile),
    Unchanged,
}

impl MergeOutcome {
    pub fn profile(&self) -> Option<&TrackedProfile> {
        match self {
            Self::Inserted(p) | Self::Replaced(p) | Self::Refreshed(p) => Some(p),
            Self::Unchanged => None,
        }
    }

    pub fn is_changed(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Source-priority merge.
///
/// 1. nothing tracked: insert
/// 2. `force`: overwrite
/// 3. tracked source is stronger: take display fields only if the incoming
///    record is strictly fresher, provenance and `last_updated` stay
/// 4. incoming source is stronger: replace
/// 5. same tier: replace unless the incoming record is older
///
/// `registered_at` of the first record survives every merge.
pub fn merge_profile(existing: Option<&TrackedProfile>, incoming: TrackedProfile, force: bool) -> MergeOutcome {
    let Some(existing) = existing else {
        return MergeOutcome::Inserted(incoming);
    };

    let replace = |incoming: TrackedProfile| {
        let merged = TrackedProfile {
            registered_at: existing.registered_at,
            ..incoming
        };
        if &merged == existing {
            MergeOutcome::Unchanged
        } else {
            MergeOutcome::Replaced(merged)
        }
    };

    if force {
        return replace(incoming);
    }

    match existing.priority().cmp(&incoming.priority()) {
        std::cmp::Ordering::Greater => {
            if incoming.last_updated <= existing.last_updated {
                return MergeOutcome::Unchanged;
            }
            if existing.display_name == incoming.display_name && existing.avatar_url == incoming.avatar_url {
                return MergeOutcome::Unchanged;
            }
            MergeOutcome::Refreshed(TrackedProfile {
                display_name: incoming.display_name,
                avatar_url: incoming.avatar_url,
                ..existing.clone()
            })
        }
        std::cmp::Ordering::Less => replace(incoming),
        std::cmp::Ordering::Equal => {
            if incoming.last_updated < existing.last_updated {
                MergeOutcome::Unchanged
            } else {
                replace(incoming)
            }
        }
    }
}
