//! Filesystem change watch capability.
//!
//! The coordinator needs one thing from the environment: "tell me when this
//! exact path is created, modified, or removed, until I stop asking". That
//! capability is expressed as the [`PathWatch`] trait so hosts can inject
//! their own backend; [`NotifyWatch`] is the production implementation on
//! top of the `notify` crate.
//!
//! Delivery ordering is not guaranteed to be strictly monotonic with writes
//! made by this same process, and backends may report redundant events.
//! Consumers must treat every notification as "re-check the path", which
//! the lock state machine's evaluation procedure is idempotent under.

use crate::error::{Result, SidelockError};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::mpsc::{Receiver, channel};

/// Capability to observe changes to a single filesystem path.
///
/// At most one path is watched at a time; calling [`PathWatch::watch`]
/// again replaces the previous subscription. Notifications are not pushed:
/// they accumulate until the consumer drains them from its own thread,
/// keeping all state transitions on the coordinator's control thread.
pub trait PathWatch {
    /// Begin watching `path`, replacing any previous subscription.
    fn watch(&mut self, path: &Path) -> Result<()>;

    /// Stop watching. A no-op when nothing is watched.
    fn unwatch(&mut self);

    /// Take all change notifications observed since the last call,
    /// returning how many there were.
    fn drain(&mut self) -> usize;
}

/// `notify`-backed watch.
///
/// Events are funneled from the backend thread into an mpsc channel and
/// consumed by [`PathWatch::drain`]; the backend thread never touches
/// coordinator state. Backend errors are drained like change events, since
/// re-evaluating on a spurious wake-up is always safe.
pub struct NotifyWatch {
    watcher: Option<RecommendedWatcher>,
    events: Option<Receiver<notify::Result<notify::Event>>>,
    watched: Option<PathBuf>,
}

impl NotifyWatch {
    /// Create a watch with no active subscription.
    pub fn new() -> Self {
        Self {
            watcher: None,
            events: None,
            watched: None,
        }
    }
}

impl Default for NotifyWatch {
    fn default() -> Self {
        Self::new()
    }
}

impl PathWatch for NotifyWatch {
    fn watch(&mut self, path: &Path) -> Result<()> {
        self.unwatch();

        let (tx, rx) = channel();
        let mut watcher = notify::recommended_watcher(tx)
            .map_err(|e| SidelockError::Watch(format!("failed to create file watcher: {}", e)))?;

        watcher
            .watch(path, RecursiveMode::NonRecursive)
            .map_err(|e| {
                SidelockError::Watch(format!("failed to watch '{}': {}", path.display(), e))
            })?;

        self.watcher = Some(watcher);
        self.events = Some(rx);
        self.watched = Some(path.to_path_buf());
        Ok(())
    }

    fn unwatch(&mut self) {
        if let (Some(watcher), Some(path)) = (self.watcher.as_mut(), self.watched.as_ref()) {
            // The path may already be gone; dropping the watcher below
            // releases the subscription either way.
            let _ = watcher.unwatch(path);
        }

        self.watcher = None;
        self.events = None;
        self.watched = None;
    }

    fn drain(&mut self) -> usize {
        let Some(events) = self.events.as_ref() else {
            return 0;
        };

        let mut count = 0;
        while events.try_recv().is_ok() {
            count += 1;
        }
        count
    }
}

/// A watch backend with no operating-system machinery behind it.
///
/// Hosts that re-trigger evaluation themselves (and tests) use this: the
/// paired [`ManualWatchHandle`] injects change notifications and exposes
/// the currently watched path for inspection.
pub struct ManualWatch {
    state: Rc<RefCell<ManualWatchState>>,
}

/// Inspection and injection handle paired with a [`ManualWatch`].
#[derive(Clone)]
pub struct ManualWatchHandle {
    state: Rc<RefCell<ManualWatchState>>,
}

#[derive(Default)]
struct ManualWatchState {
    watched: Option<PathBuf>,
    pending: usize,
}

impl ManualWatch {
    /// Create a manual watch and its paired handle.
    pub fn new() -> (Self, ManualWatchHandle) {
        let state = Rc::new(RefCell::new(ManualWatchState::default()));
        (
            Self {
                state: Rc::clone(&state),
            },
            ManualWatchHandle { state },
        )
    }
}

impl PathWatch for ManualWatch {
    fn watch(&mut self, path: &Path) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.watched = Some(path.to_path_buf());
        state.pending = 0;
        Ok(())
    }

    fn unwatch(&mut self) {
        let mut state = self.state.borrow_mut();
        state.watched = None;
        state.pending = 0;
    }

    fn drain(&mut self) -> usize {
        std::mem::take(&mut self.state.borrow_mut().pending)
    }
}

impl ManualWatchHandle {
    /// Inject one change notification.
    ///
    /// Ignored when nothing is watched, like a real backend whose
    /// subscription was already released.
    pub fn notify_change(&self) {
        let mut state = self.state.borrow_mut();
        if state.watched.is_some() {
            state.pending += 1;
        }
    }

    /// The currently watched path, if any.
    pub fn watched(&self) -> Option<PathBuf> {
        self.state.borrow().watched.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn wait_for_events(watch: &mut NotifyWatch) -> usize {
        for _ in 0..40 {
            let drained = watch.drain();
            if drained > 0 {
                return drained;
            }
            std::thread::sleep(Duration::from_millis(50));
        }
        0
    }

    #[test]
    fn manual_watch_tracks_subscription() {
        let (mut watch, handle) = ManualWatch::new();
        assert!(handle.watched().is_none());

        watch.watch(Path::new("/tmp/doc.txt.lock")).unwrap();
        assert_eq!(handle.watched(), Some(PathBuf::from("/tmp/doc.txt.lock")));

        watch.unwatch();
        assert!(handle.watched().is_none());
    }

    #[test]
    fn manual_watch_drains_injected_changes() {
        let (mut watch, handle) = ManualWatch::new();
        watch.watch(Path::new("/tmp/doc.txt.lock")).unwrap();

        handle.notify_change();
        handle.notify_change();
        assert_eq!(watch.drain(), 2);
        assert_eq!(watch.drain(), 0);
    }

    #[test]
    fn manual_watch_ignores_changes_while_unwatched() {
        let (mut watch, handle) = ManualWatch::new();

        handle.notify_change();
        assert_eq!(watch.drain(), 0);
    }

    #[test]
    #[serial]
    fn notify_watch_reports_modification() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("doc.txt.lock");
        fs::write(&path, "{}").unwrap();

        let mut watch = NotifyWatch::new();
        watch.watch(&path).unwrap();

        fs::write(&path, r#"{"id": "other"}"#).unwrap();

        assert!(wait_for_events(&mut watch) > 0);
    }

    #[test]
    #[serial]
    fn notify_watch_stops_after_unwatch() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("doc.txt.lock");
        fs::write(&path, "{}").unwrap();

        let mut watch = NotifyWatch::new();
        watch.watch(&path).unwrap();
        watch.unwatch();

        fs::write(&path, r#"{"id": "other"}"#).unwrap();
        std::thread::sleep(Duration::from_millis(200));

        assert_eq!(watch.drain(), 0);
    }

    #[test]
    fn notify_watch_on_missing_path_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("never-created.lock");

        let mut watch = NotifyWatch::new();
        assert!(watch.watch(&path).is_err());
    }
}
