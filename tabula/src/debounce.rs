//! Coalescing of bursty side effects.
//!
//! Each key carries one pending deadline. Scheduling a key again pushes
//! its deadline out (last write wins); [`Debouncer::flush`] hands back the
//! keys whose deadline has passed.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer<K: Ord> {
    window: Duration,
    pending: BTreeMap<K, Instant>,
}

impl<K: Ord + Clone> Debouncer<K> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: BTreeMap::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// (Re)arms `key` to fire one window after `now`.
    pub fn schedule(&mut self, key: K, now: Instant) {
        self.pending.insert(key, now + self.window);
    }

    pub fn cancel(&mut self, key: &K) -> bool {
        self.pending.remove(key).is_some()
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().min().copied()
    }

    /// Removes and returns the keys due at `now`, in key order.
    pub fn flush(&mut self, now: Instant) -> Vec<K> {
        let due: Vec<K> = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &due {
            self.pending.remove(key);
        }
        due
    }

    /// Removes and returns every pending key regardless of deadline.
    pub fn flush_all(&mut self) -> Vec<K> {
        std::mem::take(&mut self.pending).into_keys().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(200);

    #[test]
    fn test_burst_coalesces_into_one_flush() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(WINDOW);
        for step in 0..5 {
            debouncer.schedule("layout", start + Duration::from_millis(step * 50));
        }
        assert!(debouncer.flush(start + Duration::from_millis(300)).is_empty());
        assert_eq!(
            debouncer.flush(start + Duration::from_millis(400)),
            vec!["layout"]
        );
        assert!(debouncer.is_empty());
    }

    #[test]
    fn test_keys_fire_independently() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(WINDOW);
        debouncer.schedule(1, start);
        debouncer.schedule(2, start + Duration::from_millis(100));
        assert_eq!(debouncer.next_deadline(), Some(start + WINDOW));
        assert_eq!(debouncer.flush(start + WINDOW), vec![1]);
        assert!(debouncer.is_pending(&2));
        assert_eq!(debouncer.flush_all(), vec![2]);
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(WINDOW);
        debouncer.schedule('a', start);
        assert!(debouncer.cancel(&'a'));
        assert!(!debouncer.cancel(&'a'));
        assert!(debouncer.flush(start + WINDOW * 2).is_empty());
    }
}
