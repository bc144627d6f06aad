//! Sidelock: advisory sidecar lock-file coordinator for multi-process
//! document editing.
//!
//! Multiple independent processes editing the same logical file agree,
//! via a `<file>.lock` marker next to it, on who may read and who may
//! write. The marker carries a small JSON document naming the owning
//! instance; a filesystem watch on the marker republishes lock status
//! whenever any process changes it. There is no central arbiter and no
//! OS-level file lock — the filesystem's exclusive create is the only
//! synchronization primitive.
//!
//! # Usage
//!
//! ```no_run
//! use sidelock::{AppIdentity, LockFile, Strategy};
//!
//! let identity = AppIdentity::new("scribe", "2.1.0", "Acme", "acme.example");
//! let mut lock = LockFile::new(identity);
//! lock.set_strategy(Strategy::MultipleReadSingleWrite);
//! lock.on_settled(|status| println!("{}", status));
//! lock.set_path("manuscript.txt");
//!
//! // Hosts fold in external marker changes from their event loop.
//! lock.poll();
//!
//! if lock.can_write() {
//!     // This instance owns the lock; saving is safe.
//! }
//! ```
//!
//! Dropping the coordinator (or setting an empty path) releases the
//! watch and deletes the marker if this instance owns it.

pub mod error;
pub mod exit_codes;
pub mod identity;
pub mod lock;
pub mod watch;

pub use error::{Result, SidelockError};
pub use identity::AppIdentity;
pub use lock::{LockDocument, LockFile, LockStatus, Strategy};
pub use watch::{ManualWatch, ManualWatchHandle, NotifyWatch, PathWatch};
