//! Cancellable deferred task with a settle window.

use std::time::{Duration, Instant};

use log::debug;

/// Identifies one scheduled task; stale handles cancel nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug)]
struct Pending<T> {
    handle: TaskHandle,
    due: Instant,
    payload: T,
}

/// Holds at most one pending payload. Scheduling replaces whatever was pending and restarts
/// the settle window, so a burst of changes fires once, after the last one.
#[derive(Debug)]
pub struct Debouncer<T> {
    settle: Duration,
    next_id: u64,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    pub fn new(settle: Duration) -> Self {
        Self {
            settle,
            next_id: 0,
            pending: None,
        }
    }

    pub fn settle(&self) -> Duration {
        self.settle
    }

    /// Schedule `payload` to fire once `settle` has elapsed after `now`.
    pub fn schedule(&mut self, payload: T, now: Instant) -> TaskHandle {
        let handle = TaskHandle(self.next_id);
        self.next_id += 1;
        if let Some(previous) = self.pending.take() {
            debug!("debounce: task {} replaced by {}", previous.handle.0, handle.0);
        } else {
            debug!("debounce: task {} scheduled", handle.0);
        }
        self.pending = Some(Pending {
            handle,
            due: now + self.settle,
            payload,
        });
        handle
    }

    /// Cancel the pending task if `handle` still names it.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        match &self.pending {
            Some(pending) if pending.handle == handle => {
                debug!("debounce: task {} cancelled", handle.0);
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_handle(&self) -> Option<TaskHandle> {
        self.pending.as_ref().map(|p| p.handle)
    }

    pub fn due_at(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due)
    }

    /// Take the pending payload if its settle window has elapsed by `now`.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.pending.as_ref().is_some_and(|p| now >= p.due) {
            let fired = self.pending.take()?;
            debug!("debounce: task {} fired", fired.handle.0);
            Some(fired.payload)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SETTLE: Duration = Duration::from_millis(250);

    #[test]
    fn burst_fires_once_after_last_change() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(SETTLE);
        debouncer.schedule(1, start);
        debouncer.schedule(2, start + Duration::from_millis(100));
        debouncer.schedule(3, start + Duration::from_millis(200));

        assert_eq!(debouncer.poll(start + Duration::from_millis(300)), None);
        assert_eq!(debouncer.poll(start + Duration::from_millis(450)), Some(3));
        assert_eq!(debouncer.poll(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn stale_handle_does_not_cancel_replacement() {
        let now = Instant::now();
        let mut debouncer = Debouncer::new(SETTLE);
        let first = debouncer.schedule("a", now);
        let second = debouncer.schedule("b", now);
        assert!(!debouncer.cancel(first));
        assert!(debouncer.is_pending());
        assert!(debouncer.cancel(second));
        assert_eq!(debouncer.poll(now + SETTLE), None);
    }

    #[test]
    fn fires_exactly_at_deadline() {
        let now = Instant::now();
        let mut debouncer = Debouncer::new(SETTLE);
        debouncer.schedule((), now);
        assert_eq!(debouncer.due_at(), Some(now + SETTLE));
        assert_eq!(debouncer.poll(now + SETTLE), Some(()));
    }
}
