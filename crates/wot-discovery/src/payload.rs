use serde::{Deserialize, Serialize};
use wot_crypto::is_valid_did;

use crate::error::DiscoveryError;

/// Out-of-band introduction, as carried by a scanned code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryPayload {
    pub did: String,
    pub user_doc_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl DiscoveryPayload {
    pub fn new(did: &str, user_doc_url: &str, display_name: Option<&str>) -> Self {
        Self {
            did: did.to_string(),
            user_doc_url: user_doc_url.to_string(),
            display_name: display_name.map(str::to_string),
        }
    }

    /// Parse and validate a JSON payload.
    pub fn from_json(json: &str) -> Result<Self, DiscoveryError> {
        let payload: Self =
            serde_json::from_str(json).map_err(|e| DiscoveryError::InvalidPayload(e.to_string()))?;
        payload.validate()?;
        Ok(payload)
    }

    pub fn to_json(&self) -> Result<String, DiscoveryError> {
        serde_json::to_string(self).map_err(|e| DiscoveryError::InvalidPayload(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), DiscoveryError> {
        if !is_valid_did(&self.did) {
            return Err(DiscoveryError::InvalidDid(self.did.clone()));
        }
        if self.user_doc_url.trim().is_empty() {
            return Err(DiscoveryError::InvalidPayload("empty userDocUrl".into()));
        }
        Ok(())
    }
}
