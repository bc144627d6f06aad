//! Change notification coalescing.
//!
//! A single evaluation pass may flip several status fields at once
//! (read access, write access, lock info, claimed, path). Each mutation
//! marks the coalescer dirty; at the end of the public operation that
//! triggered the burst, one flush emits a single "state settled"
//! notification and clears the mark. Because the coordinator is
//! single-threaded and every public operation flushes exactly once after
//! its synchronous mutations, this is equivalent to a zero-delay
//! single-shot aggregation tick.

use super::status::LockStatus;

/// Callback invoked once per settled state.
pub(crate) type SettledCallback = Box<dyn FnMut(&LockStatus)>;

/// Dirty-flag accumulator for status-field mutations.
pub(crate) struct ChangeCoalescer {
    dirty: bool,
    subscriber: Option<SettledCallback>,
}

impl ChangeCoalescer {
    pub(crate) fn new() -> Self {
        Self {
            dirty: false,
            subscriber: None,
        }
    }

    /// Record that a status field changed.
    pub(crate) fn mark(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Register the settled-state subscriber, replacing any previous one.
    pub(crate) fn subscribe(&mut self, callback: SettledCallback) {
        self.subscriber = Some(callback);
    }

    /// Emit one settled notification if anything changed since the last
    /// flush, then clear the mark.
    pub(crate) fn flush(&mut self, status: &LockStatus) {
        if !self.dirty {
            return;
        }
        self.dirty = false;

        if let Some(subscriber) = self.subscriber.as_mut() {
            subscriber(status);
        }
    }
}

impl std::fmt::Debug for ChangeCoalescer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeCoalescer")
            .field("dirty", &self.dirty)
            .field("subscribed", &self.subscriber.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counting_coalescer() -> (ChangeCoalescer, Rc<Cell<usize>>) {
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);

        let mut coalescer = ChangeCoalescer::new();
        coalescer.subscribe(Box::new(move |_| seen.set(seen.get() + 1)));
        (coalescer, count)
    }

    #[test]
    fn flush_without_mark_emits_nothing() {
        let (mut coalescer, count) = counting_coalescer();

        coalescer.flush(&LockStatus::default());
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn many_marks_coalesce_into_one_notification() {
        let (mut coalescer, count) = counting_coalescer();

        coalescer.mark();
        coalescer.mark();
        coalescer.mark();
        coalescer.flush(&LockStatus::default());

        assert_eq!(count.get(), 1);
        assert!(!coalescer.is_dirty());
    }

    #[test]
    fn flush_clears_mark_for_next_burst() {
        let (mut coalescer, count) = counting_coalescer();

        coalescer.mark();
        coalescer.flush(&LockStatus::default());
        coalescer.flush(&LockStatus::default());
        assert_eq!(count.get(), 1);

        coalescer.mark();
        coalescer.flush(&LockStatus::default());
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn mark_without_subscriber_is_harmless() {
        let mut coalescer = ChangeCoalescer::new();
        coalescer.mark();
        coalescer.flush(&LockStatus::default());
        assert!(!coalescer.is_dirty());
    }
}
