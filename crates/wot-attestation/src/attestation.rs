use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wot_core::{SignatureStatus, TrustLevel};
use wot_crypto::{canonical_json, signature_status, Identity};

use crate::error::AttestationError;

/// A signed claim "`trustor_id` vouches for `trustee_id` at `level`".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustAttestation {
    pub id: String,
    pub trustor_id: String,
    pub trustee_id: String,
    pub level: TrustLevel,
    pub created_at: DateTime<Utc>,
    /// Hex-encoded Ed25519 signature by the trustor over [`Self::signing_payload`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trustor_doc_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trustee_doc_url: Option<String>,
}

impl TrustAttestation {
    /// Build a new unsigned attestation stamped with the current time.
    pub fn new(trustor_id: &str, trustee_id: &str, level: TrustLevel) -> Result<Self, AttestationError> {
        if trustor_id == trustee_id {
            return Err(AttestationError::SelfTrust(trustor_id.to_string()));
        }
        Ok(Self {
            id: Uuid::now_v7().to_string(),
            trustor_id: trustor_id.to_string(),
            trustee_id: trustee_id.to_string(),
            level,
            // Millisecond precision keeps the signed timestamp stable across
            // serializers.
            created_at: Utc::now().trunc_subsecs(3),
            signature: None,
            trustor_doc_url: None,
            trustee_doc_url: None,
        })
    }

    pub fn with_doc_urls(mut self, trustor_doc_url: Option<String>, trustee_doc_url: Option<String>) -> Self {
        self.trustor_doc_url = trustor_doc_url;
        self.trustee_doc_url = trustee_doc_url;
        self
    }

    /// Canonical bytes covered by the signature.
    ///
    /// Document URLs are routing hints and are not signed.
    pub fn signing_payload(&self) -> Vec<u8> {
        canonical_json(&serde_json::json!({
            "id": self.id,
            "trustorId": self.trustor_id,
            "trusteeId": self.trustee_id,
            "level": self.level.as_str(),
            "createdAt": self.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }))
    }

    /// Sign with the trustor's identity. Verify-only identities leave the
    /// attestation unsigned.
    pub fn sign(mut self, trustor: &Identity) -> Result<Self, AttestationError> {
        if trustor.did() != self.trustor_id {
            return Err(AttestationError::DocumentOwnerMismatch {
                expected: self.trustor_id.clone(),
                found: trustor.did().to_string(),
            });
        }
        if trustor.can_sign() {
            let sig = trustor.sign(&self.signing_payload())?;
            self.signature = Some(sig.to_hex());
        }
        Ok(self)
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    /// Check the signature against the key recovered from `trustor_id`.
    pub fn signature_status(&self) -> SignatureStatus {
        signature_status(
            &self.signing_payload(),
            self.signature.as_deref(),
            &self.trustor_id,
        )
    }

    /// The DID on the other side of this attestation from `did`.
    pub fn counterpart(&self, did: &str) -> Option<&str> {
        if self.trustor_id == did {
            Some(&self.trustee_id)
        } else if self.trustee_id == did {
            Some(&self.trustor_id)
        } else {
            None
        }
    }
}

/// Attestation shape written by earlier app versions: unsigned, with
/// `trusterDid`/`trusteeDid` and a free-form level string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyAttestation {
    pub truster_did: String,
    pub trustee_did: String,
    pub level: String,
    /// Milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truster_doc_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trustee_doc_url: Option<String>,
}

impl LegacyAttestation {
    fn level(&self) -> TrustLevel {
        match self.level.to_ascii_lowercase().as_str() {
            "full" | "verified" => TrustLevel::Full,
            _ => TrustLevel::Limited,
        }
    }
}

/// Attestation as stored in a document, across schema versions.
///
/// Normalized into [`TrustAttestation`] once, when a document is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttestationRecord {
    Current(TrustAttestation),
    Legacy(LegacyAttestation),
    /// Anything else a peer wrote. Preserved on write-back, ignored on read.
    Unrecognized(serde_json::Value),
}

impl AttestationRecord {
    /// Normalize to the current schema.
    ///
    /// Returns `None` for unrecognized records and for records that violate
    /// the no-self-trust invariant.
    pub fn normalize(&self) -> Option<TrustAttestation> {
        let attestation = match self {
            Self::Current(a) => a.clone(),
            Self::Legacy(legacy) => TrustAttestation {
                id: format!("legacy:{}:{}", legacy.truster_did, legacy.trustee_did),
                trustor_id: legacy.truster_did.clone(),
                trustee_id: legacy.trustee_did.clone(),
                level: legacy.level(),
                created_at: legacy
                    .timestamp
                    .and_then(DateTime::from_timestamp_millis)
                    .unwrap_or_default(),
                signature: None,
                trustor_doc_url: legacy.truster_doc_url.clone(),
                trustee_doc_url: legacy.trustee_doc_url.clone(),
            },
            Self::Unrecognized(_) => return None,
        };
        if attestation.trustor_id == attestation.trustee_id {
            tracing::warn!(did = %attestation.trustor_id, "ignoring self-trust attestation");
            return None;
        }
        Some(attestation)
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy(_))
    }
}

impl From<TrustAttestation> for AttestationRecord {
    fn from(attestation: TrustAttestation) -> Self {
        Self::Current(attestation)
    }
}
