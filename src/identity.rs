//! Application identity configuration.
//!
//! The lock document records which application instance claimed a file, so
//! the coordinator needs the host application's identity metadata (name,
//! version, organization, domain, process id). It is passed in explicitly
//! at construction rather than read from process-wide globals, which keeps
//! the coordinator testable with injected identities.

use crate::error::{Result, SidelockError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Identity metadata describing the application instance that participates
/// in lock coordination.
///
/// Unknown fields in an identity YAML file are silently ignored for forward
/// compatibility. The `pid` is never read from a file; it always describes
/// the current process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppIdentity {
    /// Application name (e.g., "sidelock").
    pub name: String,

    /// Application version string.
    pub version: String,

    /// Organization name.
    pub org: String,

    /// Organization domain.
    pub domain: String,

    /// Process ID of this instance.
    #[serde(skip, default = "current_pid")]
    pub pid: u32,
}

impl Default for AppIdentity {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            org: String::new(),
            domain: String::new(),
            pid: current_pid(),
        }
    }
}

impl AppIdentity {
    /// Create an identity with the given application metadata and the
    /// current process id.
    pub fn new(name: &str, version: &str, org: &str, domain: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            org: org.to_string(),
            domain: domain.to_string(),
            pid: current_pid(),
        }
    }

    /// Load an identity from a YAML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the identity YAML file
    ///
    /// # Returns
    ///
    /// * `Ok(AppIdentity)` - Successfully loaded and validated identity
    /// * `Err(SidelockError::UserError)` - Read, parse, or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            SidelockError::UserError(format!(
                "failed to read identity file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse an identity from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let identity: AppIdentity = serde_yaml::from_str(yaml)
            .map_err(|e| SidelockError::UserError(format!("failed to parse identity YAML: {}", e)))?;

        identity.validate()?;
        Ok(identity)
    }

    /// Validate identity values.
    ///
    /// The application name must be non-empty; everything else is optional.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(SidelockError::UserError(
                "identity validation failed: name must be non-empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn current_pid() -> u32 {
    std::process::id()
}
