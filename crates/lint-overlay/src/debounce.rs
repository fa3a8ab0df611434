//! Deadline-driven call coalescing.
//!
//! A [`Debouncer`] does not own a timer. Callers pass the current [`Instant`] to
//! [`Debouncer::call`] and [`Debouncer::poll`], and ask [`Debouncer::deadline`] when the next poll
//! is due. Dropping the debouncer drops whatever was pending.

use std::time::{Duration, Instant};

/// Which end of the window fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceEdge {
    /// Fire immediately on the first call, then drop calls until the window closes.
    Leading,
    /// Fire once calls stop for a full interval, with the most recent value.
    Trailing,
}

/// Coalesces a stream of values into at most one delivery per interval.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    interval: Duration,
    edge: DebounceEdge,
    pending: Option<T>,
    deadline: Option<Instant>,
}

impl<T> Debouncer<T> {
    /// Create a debouncer.
    pub fn new(interval: Duration, edge: DebounceEdge) -> Self {
        Self {
            interval,
            edge,
            pending: None,
            deadline: None,
        }
    }

    /// Shorthand for [`DebounceEdge::Leading`].
    pub fn leading(interval: Duration) -> Self {
        Self::new(interval, DebounceEdge::Leading)
    }

    /// Shorthand for [`DebounceEdge::Trailing`].
    pub fn trailing(interval: Duration) -> Self {
        Self::new(interval, DebounceEdge::Trailing)
    }

    /// The configured interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The configured edge.
    pub fn edge(&self) -> DebounceEdge {
        self.edge
    }

    /// Submit a value.
    ///
    /// Leading: returns the value if no window is open (and opens one), otherwise drops it.
    /// Trailing: stores the value, replacing any pending one, pushes the deadline out, and
    /// returns `None`.
    pub fn call(&mut self, value: T, now: Instant) -> Option<T> {
        match self.edge {
            DebounceEdge::Leading => {
                if self.deadline.is_some_and(|deadline| now < deadline) {
                    return None;
                }
                self.deadline = Some(now + self.interval);
                Some(value)
            }
            DebounceEdge::Trailing => {
                self.pending = Some(value);
                self.deadline = Some(now + self.interval);
                None
            }
        }
    }

    /// Deliver the pending trailing value once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }
        self.deadline = None;
        self.pending.take()
    }

    /// When the next [`poll`](Self::poll) can deliver something.
    pub fn deadline(&self) -> Option<Instant> {
        match self.edge {
            DebounceEdge::Leading => None,
            DebounceEdge::Trailing => self.pending.as_ref().and(self.deadline),
        }
    }

    /// Returns `true` if a trailing value is waiting.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop pending work and close any open window.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.deadline = None;
    }
}
