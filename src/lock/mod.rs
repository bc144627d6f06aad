//! Lock coordination subsystem for sidelock.
//!
//! This module implements advisory cross-process locking over a sidecar
//! marker artifact:
//! - [`LockFile`] — the coordinator state machine
//! - [`LockDocument`] — the persisted ownership record (`<target>.lock`)
//! - [`Strategy`] / [`LockStatus`] — access policy and derived status
//!
//! # Marker Files
//!
//! Marker files live alongside the target (`<target-path>.lock`) and are
//! created using **create_new** semantics (exclusive create), so exactly
//! one process wins when several probe the same absent marker; losers read
//! what the winner wrote.
//!
//! # Ownership
//!
//! Each coordinator instance mints a fresh random identity token when a
//! target is set. The instance whose token matches the marker document's
//! `id` field is the owner: it gets read and write access, and it alone
//! deletes the marker on teardown. Non-owners derive access from the
//! configured [`Strategy`].

mod debounce;
mod document;
mod file;
mod status;


// Re-export public API
pub use document::LockDocument;
pub use file::{LockFile, marker_path_for};
pub use status::{LockStatus, Strategy};
