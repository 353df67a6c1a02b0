//! Storage credential resolution.
//!
//! Credentials can be supplied inline (plain JSON or `base64:`-prefixed JSON)
//! or as a path to a JSON file. Inline credentials win when both are set.

use crate::domain::repositories::{StoreError, StoreResult};
use base64::Engine as _;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Marker prefix for base64-encoded inline credentials.
pub const BASE64_PREFIX: &str = "base64:";

/// Static credentials for an S3-compatible service.
#[derive(Clone, Deserialize)]
pub struct StorageCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default)]
    pub session_token: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl fmt::Debug for StorageCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .field("session_token", &self.session_token.as_ref().map(|_| "***"))
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl StorageCredentials {
    /// Resolves credentials from the configured sources.
    ///
    /// Priority:
    /// 1. `inline` - JSON text, optionally prefixed with `base64:`
    /// 2. `file` - path to a JSON file
    ///
    /// Returns `Ok(None)` when neither is set, leaving the default provider
    /// chain in charge.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Configuration`] if the source cannot be read,
    /// decoded or parsed.
    pub fn resolve(inline: Option<&str>, file: Option<&Path>) -> StoreResult<Option<Self>> {
        if let Some(raw) = inline.map(str::trim).filter(|raw| !raw.is_empty()) {
            return Self::from_inline(raw).map(Some);
        }

        match file {
            Some(path) => Self::from_file(path).map(Some),
            None => Ok(None),
        }
    }

    fn from_inline(raw: &str) -> StoreResult<Self> {
        let json = match raw.strip_prefix(BASE64_PREFIX) {
            Some(encoded) => {
                let decoded = base64::engine::general_purpose::STANDARD
                    .decode(encoded.trim())
                    .map_err(|e| {
                        StoreError::Configuration(format!("Invalid base64 credentials: {}", e))
                    })?;
                String::from_utf8(decoded).map_err(|e| {
                    StoreError::Configuration(format!("Credentials are not UTF-8: {}", e))
                })?
            }
            None => raw.to_string(),
        };

        Self::from_json(&json)
    }

    fn from_file(path: &Path) -> StoreResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            StoreError::Configuration(format!(
                "Failed to read credentials file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_json(&json)
    }

    fn from_json(json: &str) -> StoreResult<Self> {
        let credentials: Self = serde_json::from_str(json)
            .map_err(|e| StoreError::Configuration(format!("Invalid credentials JSON: {}", e)))?;

        if credentials.access_key_id.is_empty() || credentials.secret_access_key.is_empty() {
            return Err(StoreError::Configuration(
                "Credentials must include access_key_id and secret_access_key".to_string(),
            ));
        }

        Ok(credentials)
    }
}
