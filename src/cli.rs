//! CLI argument parsing for sidelock.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use sidelock::error::{Result, SidelockError};
use sidelock::identity::AppIdentity;
use std::path::PathBuf;

/// Sidelock: advisory sidecar lock-file coordinator.
///
/// Processes editing the same file coordinate through a `<file>.lock`
/// marker next to it: whoever records their identity token in the marker
/// owns the lock, everyone else derives read access from the chosen
/// strategy. No daemon, no OS-level locks; the marker file is the whole
/// protocol.
#[derive(Parser, Debug)]
#[command(name = "sidelock")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for sidelock.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the lock marker document for a file, if one exists.
    ///
    /// Reads `<file>.lock` without participating in coordination.
    Inspect(InspectArgs),

    /// Claim the lock for a file.
    ///
    /// Exits with code 4 when write access could not be obtained.
    /// The lock is released when the process exits.
    Claim(ClaimArgs),

    /// Follow a file's lock status.
    ///
    /// Participates in coordination (claims the lock when nobody holds
    /// it) and prints one line per settled status change.
    Watch(WatchArgs),
}

/// Identity flags shared by coordinating commands.
#[derive(Parser, Debug)]
pub struct IdentityArgs {
    /// Identity YAML file (keys: name, version, org, domain).
    #[arg(long)]
    pub identity: Option<PathBuf>,

    /// Override the application name recorded in lock documents.
    #[arg(long)]
    pub app_name: Option<String>,

    /// Override the application version recorded in lock documents.
    #[arg(long)]
    pub app_version: Option<String>,

    /// Override the organization name recorded in lock documents.
    #[arg(long)]
    pub org: Option<String>,

    /// Override the organization domain recorded in lock documents.
    #[arg(long)]
    pub domain: Option<String>,
}

impl IdentityArgs {
    /// Resolve the effective identity: YAML file (or defaults), then
    /// flag overrides.
    pub fn resolve(&self) -> Result<AppIdentity> {
        let mut identity = match &self.identity {
            Some(path) => AppIdentity::load(path)?,
            None => AppIdentity::default(),
        };

        if let Some(name) = &self.app_name {
            identity.name = name.clone();
        }
        if let Some(version) = &self.app_version {
            identity.version = version.clone();
        }
        if let Some(org) = &self.org {
            identity.org = org.clone();
        }
        if let Some(domain) = &self.domain {
            identity.domain = domain.clone();
        }

        identity.validate()?;
        Ok(identity)
    }
}

/// Arguments for the `inspect` command.
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Target file whose marker should be inspected.
    pub file: PathBuf,
}

/// Arguments for the `claim` command.
#[derive(Parser, Debug)]
pub struct ClaimArgs {
    /// Target file to claim the lock for.
    pub file: PathBuf,

    /// How long to hold the lock before releasing, in milliseconds.
    #[arg(long, default_value_t = 0)]
    pub hold_ms: u64,

    /// Access policy when the lock is held elsewhere.
    #[arg(long, default_value = "exclusive_read_write")]
    pub strategy: String,

    #[command(flatten)]
    pub identity: IdentityArgs,
}

/// Arguments for the `watch` command.
#[derive(Parser, Debug)]
pub struct WatchArgs {
    /// Target file to follow.
    pub file: PathBuf,

    /// Poll interval in milliseconds.
    #[arg(long, default_value_t = 500)]
    pub interval_ms: u64,

    /// Print the initial status and exit.
    #[arg(long)]
    pub once: bool,

    /// Access policy when the lock is held elsewhere.
    #[arg(long, default_value = "multiple_read_single_write")]
    pub strategy: String,

    #[command(flatten)]
    pub identity: IdentityArgs,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

/// Parse a strategy flag value.
pub fn parse_strategy(value: &str) -> Result<sidelock::lock::Strategy> {
    sidelock::lock::Strategy::from_str(value).ok_or_else(|| {
        SidelockError::UserError(format!(
            "unknown strategy '{}' (expected 'exclusive_read_write' or 'multiple_read_single_write')",
            value
        ))
    })
}
