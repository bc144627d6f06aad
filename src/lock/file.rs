//! The lock coordinator state machine.
//!
//! A [`LockFile`] coordinates advisory access to one target file through a
//! sidecar marker artifact (`<target>.lock`). The marker's existence and
//! contents are the whole protocol: whoever's identity token is recorded
//! in the marker document owns the lock, everyone else derives read/write
//! access from the configured [`Strategy`]. The filesystem's exclusive
//! create is the only synchronization primitive; there is no arbiter and
//! no lease.
//!
//! All operations run on the consumer's thread. External changes to the
//! marker are observed through a [`PathWatch`] subscription and folded in
//! by [`LockFile::poll`]; re-running the evaluation procedure is always
//! safe, so redundant or stale notifications are harmless.
//!
//! Filesystem errors never escape this type. They degrade the derived
//! status (no read, no write, not claimed) and recovery happens passively
//! on the next observed change or consumer-triggered evaluation.

use super::debounce::ChangeCoalescer;
use super::document::LockDocument;
use super::status::{LockStatus, Strategy};
use crate::error::{Result, SidelockError};
use crate::identity::AppIdentity;
use crate::watch::{NotifyWatch, PathWatch};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Cross-process advisory lock coordinator for a single target file.
pub struct LockFile {
    identity: AppIdentity,
    strategy: Strategy,

    file_path: PathBuf,
    lock_file_path: Option<PathBuf>,
    unique_id: Option<String>,

    lock_info: Option<LockDocument>,
    can_read: bool,
    can_write: bool,
    claimed: bool,

    watch: Box<dyn PathWatch>,
    watch_attached: bool,
    changes: ChangeCoalescer,
}

impl LockFile {
    /// Create a coordinator with the default (`notify`-backed) watch.
    pub fn new(identity: AppIdentity) -> Self {
        Self::with_watch(identity, Box::new(NotifyWatch::new()))
    }

    /// Create a coordinator with an injected watch backend.
    pub fn with_watch(identity: AppIdentity, watch: Box<dyn PathWatch>) -> Self {
        Self {
            identity,
            strategy: Strategy::default(),
            file_path: PathBuf::new(),
            lock_file_path: None,
            unique_id: None,
            lock_info: None,
            can_read: false,
            can_write: false,
            claimed: false,
            watch,
            watch_attached: false,
            changes: ChangeCoalescer::new(),
        }
    }

    /// Set the target file to coordinate on.
    ///
    /// Tears down any existing coordination state (detaching the watch and
    /// deleting the marker if this instance owns it), then re-initializes
    /// against the new path: if it resolves to an existing regular file, a
    /// fresh identity token is minted, the marker path is derived, and
    /// status is evaluated, which claims the lock when no one else holds
    /// it. An empty path leaves the coordinator unset.
    pub fn set_path<P: AsRef<Path>>(&mut self, path: P) {
        let path = path.as_ref();
        if self.file_path.as_path() == path {
            return;
        }

        self.teardown();
        self.file_path = path.to_path_buf();
        self.initialize();

        self.changes.mark();
        self.flush_changes();
    }

    /// Unset the target, releasing all resources immediately.
    ///
    /// This is the cancellation operation: the watch is detached and an
    /// owned marker deleted, synchronously.
    pub fn unset(&mut self) {
        self.set_path("");
    }

    /// Change the access policy applied when the marker is held elsewhere.
    ///
    /// Re-evaluates status immediately without touching the marker.
    pub fn set_strategy(&mut self, strategy: Strategy) {
        if self.strategy == strategy {
            return;
        }

        self.strategy = strategy;
        self.evaluate_status();
        self.flush_changes();
    }

    /// Try to take the lock for the current target.
    ///
    /// Resets the in-memory lock info and re-evaluates, which writes a
    /// fresh marker when none exists on disk. Returns whether a valid
    /// marker exists afterwards — note that this is true even when the
    /// marker belongs to someone else; check [`LockFile::can_write`] to
    /// learn whether this instance is the owner. Claiming while already
    /// the owner changes nothing.
    pub fn claim(&mut self) -> bool {
        self.set_lock_info(None);
        self.evaluate_status();
        self.flush_changes();
        self.claimed
    }

    /// Fold in any externally observed marker changes.
    ///
    /// Drains the watch subscription and re-evaluates if anything was
    /// reported. Safe to call at any cadence. Returns whether a change
    /// was observed.
    pub fn poll(&mut self) -> bool {
        let changed = self.watch_attached && self.watch.drain() > 0;
        if changed {
            self.evaluate_status();
        }
        self.flush_changes();
        changed
    }

    /// Re-run status evaluation without waiting for a watch notification.
    pub fn refresh(&mut self) {
        self.evaluate_status();
        self.flush_changes();
    }

    /// Register the settled-state callback, replacing any previous one.
    ///
    /// Invoked once per public operation that changed at least one status
    /// field, however many fields the operation touched.
    pub fn on_settled<F>(&mut self, callback: F)
    where
        F: FnMut(&LockStatus) + 'static,
    {
        self.changes.subscribe(Box::new(callback));
    }

    /// Snapshot of the derived status.
    pub fn status(&self) -> LockStatus {
        LockStatus {
            can_read: self.can_read,
            can_write: self.can_write,
            claimed: self.claimed,
            lock_info: self.lock_info.clone(),
        }
    }

    /// The current target path (empty when unset).
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// The derived marker path, when a target is set and exists.
    pub fn marker_path(&self) -> Option<&Path> {
        self.lock_file_path.as_deref()
    }

    /// The current access policy.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Whether this instance may read the target.
    pub fn can_read(&self) -> bool {
        self.can_read
    }

    /// Whether this instance may write the target.
    pub fn can_write(&self) -> bool {
        self.can_write
    }

    /// Whether a valid marker exists, regardless of owner.
    pub fn is_claimed(&self) -> bool {
        self.claimed
    }

    /// The marker document currently reflected in memory, if any.
    pub fn lock_info(&self) -> Option<&LockDocument> {
        self.lock_info.as_ref()
    }

    fn initialize(&mut self) {
        // teardown() has already run; all derived state is clear.
        if self.file_path.as_os_str().is_empty() {
            return;
        }

        let Ok(meta) = fs::metadata(&self.file_path) else {
            return;
        };
        if !meta.is_file() {
            return;
        }

        self.unique_id = Some(Uuid::new_v4().to_string());
        self.lock_file_path = Some(marker_path_for(&self.file_path));
        self.evaluate_status();
    }

    /// Derive read/write/claimed status from the marker artifact.
    ///
    /// Invoked after every path/strategy change and every observed marker
    /// change. Creates the marker when it is absent and this instance
    /// never held lock info (the optimistic claim-on-absence); otherwise
    /// only reads.
    fn evaluate_status(&mut self) {
        let Some(lock_path) = self.lock_file_path.clone() else {
            return;
        };

        if !lock_path.exists() {
            if self.lock_info.is_none() {
                if self.write_marker(&lock_path).is_err() {
                    // Permission problem or a concurrent creator won the
                    // race; either way this pass ends degraded and the
                    // next evaluation reads whatever is on disk.
                    self.set_can_read(false);
                    self.set_can_write(false);
                    self.set_lock_info(None);
                    return;
                }
                self.set_claimed(true);
            } else {
                // The lock was released externally.
                self.set_claimed(false);
            }
        }

        let content = match fs::read_to_string(&lock_path) {
            Ok(content) => content,
            Err(_) => {
                self.set_can_read(false);
                self.set_can_write(false);
                self.set_lock_info(None);
                self.set_claimed(false);
                return;
            }
        };

        self.attach_watch(&lock_path);

        let info = LockDocument::from_json_str(&content)
            .ok()
            .filter(|doc| !doc.is_empty());
        self.set_lock_info(info.clone());

        let Some(info) = info else {
            self.set_can_read(false);
            self.set_can_write(false);
            self.set_claimed(false);
            return;
        };

        let locked_by_someone_else = self.unique_id.as_deref() != Some(info.id.as_str());
        if locked_by_someone_else {
            self.set_can_write(false);
            self.set_can_read(self.strategy == Strategy::MultipleReadSingleWrite);
        } else {
            self.set_can_read(true);
            self.set_can_write(true);
        }

        self.set_claimed(true);
    }

    /// Write a fresh marker document using exclusive-create semantics.
    ///
    /// Losing the creation race surfaces as `RaceLost`; any other failure
    /// as `AccessDenied`. A half-written marker is removed so the loser of
    /// a crash does not poison the path.
    fn write_marker(&self, lock_path: &Path) -> Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(lock_path)
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::AlreadyExists {
                    SidelockError::RaceLost(format!(
                        "lock file '{}' appeared before it could be created",
                        lock_path.display()
                    ))
                } else {
                    SidelockError::AccessDenied(format!(
                        "failed to create lock file '{}': {}",
                        lock_path.display(),
                        e
                    ))
                }
            })?;

        let document = LockDocument::new(
            &self.identity,
            self.unique_id.as_deref().unwrap_or_default(),
        );
        let json = document.to_json()?;

        file.write_all(json.as_bytes()).map_err(|e| {
            let _ = fs::remove_file(lock_path);
            SidelockError::AccessDenied(format!("failed to write lock document: {}", e))
        })?;

        file.sync_all().map_err(|e| {
            let _ = fs::remove_file(lock_path);
            SidelockError::AccessDenied(format!("failed to sync lock file: {}", e))
        })?;

        Ok(())
    }

    /// Release everything held for the current target.
    ///
    /// The marker is deleted only when the document captured before
    /// clearing carries this instance's own identity token; a marker
    /// another process now owns is left untouched.
    fn teardown(&mut self) {
        let info = self.lock_info.clone();

        self.set_can_read(false);
        self.set_can_write(false);
        self.set_lock_info(None);
        self.set_claimed(false);
        self.detach_watch();

        if let Some(lock_path) = self.lock_file_path.take() {
            if lock_path.exists() {
                let owns_marker = match (self.unique_id.as_deref(), info.as_ref()) {
                    (Some(unique_id), Some(info)) => info.id == unique_id,
                    _ => false,
                };

                if owns_marker {
                    if let Err(e) = fs::remove_file(&lock_path) {
                        eprintln!(
                            "Warning: failed to remove lock file '{}': {}",
                            lock_path.display(),
                            e
                        );
                    }
                }
            }
        }

        self.unique_id = None;
    }

    fn attach_watch(&mut self, lock_path: &Path) {
        if self.watch_attached {
            return;
        }

        match self.watch.watch(lock_path) {
            Ok(()) => self.watch_attached = true,
            Err(e) => eprintln!("Warning: {}", e),
        }
    }

    fn detach_watch(&mut self) {
        if self.watch_attached {
            self.watch.unwatch();
            self.watch_attached = false;
        }
    }

    fn flush_changes(&mut self) {
        if !self.changes.is_dirty() {
            return;
        }
        let status = self.status();
        self.changes.flush(&status);
    }

    fn set_can_read(&mut self, val: bool) {
        if self.can_read != val {
            self.can_read = val;
            self.changes.mark();
        }
    }

    fn set_can_write(&mut self, val: bool) {
        if self.can_write != val {
            self.can_write = val;
            self.changes.mark();
        }
    }

    fn set_lock_info(&mut self, val: Option<LockDocument>) {
        if self.lock_info != val {
            self.lock_info = val;
            self.changes.mark();
        }
    }

    fn set_claimed(&mut self, val: bool) {
        if self.claimed == val {
            return;
        }
        self.claimed = val;
        self.changes.mark();

        // A marker that stopped being claimed is no longer worth watching;
        // evaluation re-attaches when it becomes readable again.
        if !val {
            self.detach_watch();
        }
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Derive the marker path: the `.lock` suffix appended to the full file
/// name, alongside the target.
pub fn marker_path_for(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(".lock");
    PathBuf::from(os)
}
