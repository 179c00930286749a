use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Level at which a trustor vouches for a trustee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustLevel {
    /// Full trust: the trustor has verified the trustee in person.
    Full,
    /// Limited trust: the trustor knows of the trustee but has not verified them.
    Limited,
}

impl TrustLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Limited => "limited",
        }
    }
}

impl fmt::Display for TrustLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrustLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "limited" => Ok(Self::Limited),
            other => Err(CoreError::InvalidTrustLevel(other.to_string())),
        }
    }
}

/// Channel through which a profile fact was learned.
///
/// Used to rank conflicting profile data: see [`DiscoverySource::priority`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiscoverySource {
    /// The local user's own profile.
    #[serde(rename = "self")]
    SelfProfile,
    /// A DID the local user attested trust in.
    TrustGiven,
    /// A DID that attested trust in the local user.
    TrustReceived,
    /// Found in the attestations of a directly trusted peer.
    #[serde(rename = "network-2nd")]
    Network2nd,
    /// Registered out-of-band, e.g. from a scanned code.
    External,
    /// Listed in a shared workspace document.
    Workspace,
}

impl DiscoverySource {
    /// Merge priority. Higher wins.
    pub fn priority(&self) -> u8 {
        match self {
            Self::SelfProfile => 5,
            Self::TrustGiven | Self::TrustReceived => 4,
            Self::Network2nd => 3,
            Self::External => 2,
            Self::Workspace => 1,
        }
    }

    /// Whether this source is a direct (1st degree) trust relationship.
    pub fn is_first_degree(&self) -> bool {
        matches!(self, Self::TrustGiven | Self::TrustReceived)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SelfProfile => "self",
            Self::TrustGiven => "trust-given",
            Self::TrustReceived => "trust-received",
            Self::Network2nd => "network-2nd",
            Self::External => "external",
            Self::Workspace => "workspace",
        }
    }
}

impl fmt::Display for DiscoverySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of checking a signature attached to a profile or attestation.
///
/// `Invalid` covers both forged signatures and malformed input; callers must
/// only read it as "do not trust".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureStatus {
    Valid,
    Invalid,
    /// No signature present (legacy or unsigned data).
    Missing,
    /// Not yet checked; the document has not loaded.
    Pending,
}

impl fmt::Display for SignatureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Valid => "valid",
            Self::Invalid => "invalid",
            Self::Missing => "missing",
            Self::Pending => "pending",
        };
        f.write_str(s)
    }
}

/// Load progress of a document or of the profile materialized from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    Loading,
    Loaded,
    /// Terminal until the document is explicitly registered again.
    Unavailable,
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Loading => "loading",
            Self::Loaded => "loaded",
            Self::Unavailable => "unavailable",
        };
        f.write_str(s)
    }
}
