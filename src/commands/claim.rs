//! Implementation of the `sidelock claim` command.
//!
//! Claims the lock for a target file and holds it for `--hold-ms`
//! milliseconds. The marker is released when the coordinator drops on
//! exit; a claim that did not obtain write access exits with code 4 and
//! names the current holder.

use crate::cli::{ClaimArgs, parse_strategy};
use sidelock::error::{Result, SidelockError};
use sidelock::lock::{LockDocument, LockFile};
use std::thread;
use std::time::Duration;

pub fn cmd_claim(args: ClaimArgs) -> Result<()> {
    let identity = args.identity.resolve()?;
    let strategy = parse_strategy(&args.strategy)?;

    if !args.file.is_file() {
        return Err(SidelockError::UserError(format!(
            "target file '{}' does not exist or is not a regular file",
            args.file.display()
        )));
    }

    let mut lock = LockFile::new(identity);
    lock.set_strategy(strategy);
    lock.set_path(&args.file);

    if !lock.can_write() {
        let holder = match lock.lock_info() {
            Some(info) => describe_holder(info),
            None => "unreadable lock document".to_string(),
        };
        return Err(SidelockError::LockHeld(holder));
    }

    eprintln!("claimed {}", args.file.display());
    eprintln!("  {}", lock.status());

    if args.hold_ms > 0 {
        eprintln!("holding for {}ms", args.hold_ms);
        thread::sleep(Duration::from_millis(args.hold_ms));
    }

    // Dropping the coordinator deletes the marker we own.
    Ok(())
}

fn describe_holder(info: &LockDocument) -> String {
    let mut holder = if info.name.is_empty() {
        "?".to_string()
    } else {
        info.name.clone()
    };

    if let Some(pid) = info.pid {
        holder.push_str(&format!("[{}]", pid));
    }
    if let Some(owner) = &info.owner {
        holder.push_str(&format!(" ({})", owner));
    }
    if !info.timestamp.is_empty() {
        holder.push_str(&format!(" since {}", info.timestamp));
    }

    holder
}
