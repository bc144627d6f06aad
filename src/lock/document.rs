//! Lock document codec.
//!
//! The marker artifact contains a small JSON document identifying the
//! owning application instance. Parsing is tolerant: missing keys take
//! defaults and unknown keys are preserved, so documents written by newer
//! or older writers still round-trip. An empty or unparsable document is a
//! degraded lock, not an absent one; the state machine makes that
//! distinction, the codec only reports it.

use crate::error::{Result, SidelockError};
use crate::identity::AppIdentity;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// The ownership record persisted inside a marker artifact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockDocument {
    /// Application name of the owning instance.
    pub name: String,

    /// Process ID of the owning instance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<i64>,

    /// Opaque identity token of the owning coordinator instance.
    pub id: String,

    /// Application version of the owning instance.
    pub version: String,

    /// Organization name of the owning instance.
    pub org: String,

    /// Organization domain of the owning instance.
    pub domain: String,

    /// When the lock was taken (RFC 3339).
    pub timestamp: String,

    /// Owner of the lock (e.g., `user@HOST`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Unknown fields preserved for forward compatibility.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl LockDocument {
    /// Create a fresh document for the given identity and instance token.
    pub fn new(identity: &AppIdentity, unique_id: &str) -> Self {
        Self {
            name: identity.name.clone(),
            pid: Some(i64::from(identity.pid)),
            id: unique_id.to_string(),
            version: identity.version.clone(),
            org: identity.org.clone(),
            domain: identity.domain.clone(),
            timestamp: Utc::now().to_rfc3339(),
            owner: Some(get_owner_string()),
            extra: BTreeMap::new(),
        }
    }

    /// Whether the document carries no information at all.
    ///
    /// An all-default document (as parsed from `{}`) is indistinguishable
    /// from an unreadable lock and drives the coordinator into its
    /// degraded state.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Parse a lock document from a JSON string.
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| SidelockError::MalformedDocument(e.to_string()))
    }

    /// Parse a lock document from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            SidelockError::AccessDenied(format!(
                "failed to read lock file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_json_str(&content)
    }

    /// Serialize the document to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SidelockError::MalformedDocument(e.to_string()))
    }
}

/// Get the owner string for lock documents.
pub(crate) fn get_owner_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}
