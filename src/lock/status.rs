//! Lock strategy and derived status types.

use super::document::LockDocument;
use serde::{Deserialize, Serialize};

/// Policy governing access granted when the marker is held by another
/// coordinator instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// A foreign lock grants neither read nor write access (default, safest).
    #[default]
    ExclusiveReadWrite,
    /// A foreign lock still grants read access, but not write access.
    MultipleReadSingleWrite,
}

impl Strategy {
    /// Parse a strategy from a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "exclusive_read_write" | "exclusive" => Some(Self::ExclusiveReadWrite),
            "multiple_read_single_write" | "shared_read" => Some(Self::MultipleReadSingleWrite),
            _ => None,
        }
    }
}

/// Derived coordination status, recomputed by the state machine.
///
/// `claimed` means a valid marker exists and its contents were read
/// successfully, independent of whether this instance is the owner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LockStatus {
    /// Whether this instance may read the target.
    pub can_read: bool,

    /// Whether this instance may write the target.
    pub can_write: bool,

    /// Whether a valid marker exists (ours or anyone's).
    pub claimed: bool,

    /// The marker document currently on disk, if it parsed.
    pub lock_info: Option<LockDocument>,
}

impl std::fmt::Display for LockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn yn(v: bool) -> &'static str {
            if v { "yes" } else { "no" }
        }

        write!(
            f,
            "read={} write={} claimed={}",
            yn(self.can_read),
            yn(self.can_write),
            yn(self.claimed)
        )?;

        if let Some(info) = &self.lock_info {
            let name = if info.name.is_empty() {
                "?"
            } else {
                info.name.as_str()
            };
            write!(f, " holder={}", name)?;
            if let Some(pid) = info.pid {
                write!(f, "[{}]", pid)?;
            }
            if let Some(owner) = &info.owner {
                write!(f, " ({})", owner)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_from_str() {
        assert_eq!(
            Strategy::from_str("exclusive_read_write"),
            Some(Strategy::ExclusiveReadWrite)
        );
        assert_eq!(
            Strategy::from_str("multiple_read_single_write"),
            Some(Strategy::MultipleReadSingleWrite)
        );
        assert_eq!(
            Strategy::from_str("shared_read"),
            Some(Strategy::MultipleReadSingleWrite)
        );
        assert_eq!(Strategy::from_str("nonsense"), None);
    }

    #[test]
    fn strategy_default_is_exclusive() {
        assert_eq!(Strategy::default(), Strategy::ExclusiveReadWrite);
    }

    #[test]
    fn strategy_serializes_snake_case() {
        let json = serde_json::to_string(&Strategy::MultipleReadSingleWrite).unwrap();
        assert_eq!(json, "\"multiple_read_single_write\"");
    }

    #[test]
    fn status_display_without_holder() {
        let status = LockStatus {
            can_read: true,
            can_write: false,
            claimed: true,
            lock_info: None,
        };
        assert_eq!(format!("{}", status), "read=yes write=no claimed=yes");
    }

    #[test]
    fn status_display_with_holder() {
        let status = LockStatus {
            can_read: false,
            can_write: false,
            claimed: true,
            lock_info: Some(LockDocument {
                name: "scribe".to_string(),
                pid: Some(42),
                owner: Some("alice@laptop".to_string()),
                ..Default::default()
            }),
        };

        let display = format!("{}", status);
        assert!(display.contains("holder=scribe[42]"));
        assert!(display.contains("(alice@laptop)"));
    }
}
