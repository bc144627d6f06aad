//! Command implementations for sidelock.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations.

mod claim;
mod inspect;
mod watch;

use crate::cli::Command;
use sidelock::error::Result;

/// Dispatch a command to its implementation.
pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Inspect(args) => inspect::cmd_inspect(args),
        Command::Claim(args) => claim::cmd_claim(args),
        Command::Watch(args) => watch::cmd_watch(args),
    }
}
