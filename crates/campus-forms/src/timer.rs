//! Deterministic one-shot timers on a virtual clock.
//!
//! The host advances the clock explicitly (wall-clock deltas in the terminal,
//! fixed steps in tests). There is no cancellation: a payload that no longer
//! applies is ignored by whoever receives it when it fires.

use std::collections::BTreeMap;
use std::time::Duration;

/// A queue of payloads due at points on a virtual clock.
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    now: Duration,
    seq: u64,
    pending: BTreeMap<(Duration, u64), T>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            seq: 0,
            pending: BTreeMap::new(),
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed on the virtual clock.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule `payload` to fire `delay` from now. Returns the deadline.
    pub fn schedule(&mut self, delay: Duration, payload: T) -> Duration {
        let deadline = self.now.saturating_add(delay);
        self.pending.insert((deadline, self.seq), payload);
        self.seq += 1;
        deadline
    }

    /// Advance the clock by `by` and take every payload now due, in deadline
    /// order (ties in scheduling order).
    pub fn advance(&mut self, by: Duration) -> Vec<T> {
        self.now = self.now.saturating_add(by);
        let not_due = self.pending.split_off(&(self.now, u64::MAX));
        std::mem::replace(&mut self.pending, not_due)
            .into_values()
            .collect()
    }

    /// Deadline of the earliest pending payload.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.keys().next().map(|&(deadline, _)| deadline)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
