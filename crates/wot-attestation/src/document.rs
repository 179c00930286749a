//! Schema of the personal and workspace documents.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use wot_core::SignatureStatus;
use wot_crypto::{canonical_json, signature_status, Identity};

use crate::attestation::{AttestationRecord, TrustAttestation};
use crate::error::AttestationError;

/// JSON key of the outgoing attestation map.
pub const TRUST_GIVEN: &str = "trustGiven";
/// JSON key of the incoming attestation map.
pub const TRUST_RECEIVED: &str = "trustReceived";

/// Self-published profile fields, signed by the document owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl ProfileSection {
    pub fn new(display_name: Option<String>, avatar_url: Option<String>) -> Self {
        Self {
            display_name,
            avatar_url,
            updated_at: Utc::now().trunc_subsecs(3),
            signature: None,
        }
    }

    /// Canonical bytes covered by the profile signature.
    pub fn signing_payload(&self, did: &str) -> Vec<u8> {
        canonical_json(&serde_json::json!({
            "did": did,
            "displayName": self.display_name,
            "avatarUrl": self.avatar_url,
            "updatedAt": self.updated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }))
    }

    pub fn sign(mut self, owner: &Identity) -> Result<Self, AttestationError> {
        if owner.can_sign() {
            self.signature = Some(owner.sign(&self.signing_payload(owner.did()))?.to_hex());
        }
        Ok(self)
    }

    pub fn signature_status(&self, did: &str) -> SignatureStatus {
        signature_status(&self.signing_payload(did), self.signature.as_deref(), did)
    }
}

/// A user's personal document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    pub did: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileSection>,
    /// Outgoing attestations keyed by trustee DID.
    #[serde(default)]
    pub trust_given: BTreeMap<String, AttestationRecord>,
    /// Incoming attestations keyed by trustor DID.
    #[serde(default)]
    pub trust_received: BTreeMap<String, AttestationRecord>,
}

impl UserDocument {
    pub fn new(did: &str) -> Self {
        Self {
            did: did.to_string(),
            profile: None,
            trust_given: BTreeMap::new(),
            trust_received: BTreeMap::new(),
        }
    }

    pub fn from_value(value: &Value) -> Result<Self, AttestationError> {
        Self::deserialize(value).map_err(|e| AttestationError::MalformedDocument(e.to_string()))
    }

    pub fn to_value(&self) -> Result<Value, AttestationError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Outgoing attestations, normalized. Entries whose trustor is not the
    /// owner or whose key disagrees with the trustee are dropped.
    pub fn attestations_given(&self) -> BTreeMap<String, TrustAttestation> {
        self.trust_given
            .iter()
            .filter_map(|(key, record)| {
                let att = record.normalize()?;
                (att.trustor_id == self.did && &att.trustee_id == key).then(|| (key.clone(), att))
            })
            .collect()
    }

    /// Incoming attestations, normalized. Entries whose trustee is not the
    /// owner or whose key disagrees with the trustor are dropped.
    pub fn attestations_received(&self) -> BTreeMap<String, TrustAttestation> {
        self.trust_received
            .iter()
            .filter_map(|(key, record)| {
                let att = record.normalize()?;
                (att.trustee_id == self.did && &att.trustor_id == key).then(|| (key.clone(), att))
            })
            .collect()
    }

    /// Document URL of `did` as recorded by any attestation in this document.
    pub fn known_doc_url(&self, did: &str) -> Option<String> {
        let given = self
            .attestations_given()
            .get(did)
            .and_then(|a| a.trustee_doc_url.clone());
        given.or_else(|| {
            self.attestations_received()
                .get(did)
                .and_then(|a| a.trustor_doc_url.clone())
        })
    }

    /// Signature status of the owner's profile section.
    pub fn profile_signature_status(&self) -> SignatureStatus {
        match &self.profile {
            Some(profile) => profile.signature_status(&self.did),
            None => SignatureStatus::Missing,
        }
    }
}

/// An identity listed in a shared workspace document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceIdentity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Shared workspace document; only its identity table is read here.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceDocument {
    #[serde(default)]
    pub identities: BTreeMap<String, WorkspaceIdentity>,
}

impl WorkspaceDocument {
    pub fn from_value(value: &Value) -> Result<Self, AttestationError> {
        Self::deserialize(value).map_err(|e| AttestationError::MalformedDocument(e.to_string()))
    }
}
