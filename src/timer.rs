//! Cancellable scheduled callbacks for the cooperative event loop.
//!
//! Nothing runs on its own: the owner calls [`Timers::poll`] every frame and
//! receives the events whose deadline has passed, earliest first.

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

/// Handle for a scheduled event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// A queue of events keyed by deadline.
#[derive(Debug)]
pub struct Timers<E> {
    /// Pending events ordered by (deadline, insertion sequence).
    queue: BTreeMap<(Instant, u64), E>,
    /// Deadline lookup for cancellation.
    deadlines: HashMap<TimerId, Instant>,
    next_id: u64,
}

impl<E> Default for Timers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Timers<E> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            queue: BTreeMap::new(),
            deadlines: HashMap::new(),
            next_id: 0,
        }
    }

    /// Schedules `event` to fire at `at`.
    pub fn schedule(&mut self, at: Instant, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.queue.insert((at, id.0), event);
        self.deadlines.insert(id, at);
        id
    }

    /// Cancels a pending event. Returns false if it already fired or was
    /// cancelled before.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.deadlines.remove(&id) {
            Some(at) => self.queue.remove(&(at, id.0)).is_some(),
            None => false,
        }
    }

    /// Cancels everything.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.deadlines.clear();
    }

    /// Removes and returns the next event due at or before `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<(Instant, E)> {
        let (&(at, seq), _) = self.queue.first_key_value()?;
        if at > now {
            return None;
        }
        self.deadlines.remove(&TimerId(seq));
        self.queue.remove(&(at, seq)).map(|event| (at, event))
    }

    /// Removes and returns every event due at or before `now`, in order.
    pub fn poll(&mut self, now: Instant) -> Vec<(Instant, E)> {
        let mut due = Vec::new();
        while let Some(item) = self.pop_due(now) {
            due.push(item);
        }
        due
    }

    /// Deadline of the earliest pending event.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.queue.keys().next().map(|(at, _)| *at)
    }

    /// Whether an event is still pending.
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns true if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_fires_in_deadline_order() {
        let start = Instant::now();
        let mut timers = Timers::new();
        timers.schedule(start + Duration::from_millis(20), "b");
        timers.schedule(start + Duration::from_millis(10), "a");
        timers.schedule(start + Duration::from_millis(30), "c");

        assert!(timers.poll(start).is_empty());
        let due: Vec<_> = timers
            .poll(start + Duration::from_millis(25))
            .into_iter()
            .map(|(_, e)| e)
            .collect();
        assert_eq!(due, vec!["a", "b"]);
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn test_same_deadline_keeps_insertion_order() {
        let at = Instant::now();
        let mut timers = Timers::new();
        timers.schedule(at, 1);
        timers.schedule(at, 2);
        let due: Vec<_> = timers.poll(at).into_iter().map(|(_, e)| e).collect();
        assert_eq!(due, vec![1, 2]);
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut timers = Timers::new();
        let id = timers.schedule(start + Duration::from_secs(1), ());
        assert!(timers.is_pending(id));
        assert!(timers.cancel(id));
        assert!(!timers.cancel(id));
        assert!(timers.poll(start + Duration::from_secs(2)).is_empty());
        assert_eq!(timers.next_deadline(), None);
    }
}
