//! Replay suppression for submission signatures.
//!
//! A bounded, time-expiring record of signatures that already authenticated a
//! submission. Capacity eviction drops the least recently touched entry;
//! expired entries read as absent.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use lru::LruCache;
use parking_lot::Mutex;

use crate::clock::Clock;

pub const DEFAULT_REPLAY_TTL: Duration = Duration::from_secs(300);
pub const DEFAULT_REPLAY_CAPACITY: usize = 10_000;

pub struct ReplayGuard {
    /// signature key -> expiry (offset from unix epoch)
    entries: Mutex<LruCache<Vec<u8>, Duration>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl ReplayGuard {
    pub fn new(capacity: usize, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
            clock,
        }
    }

    /// Membership test without recording.
    pub fn is_seen(&self, key: &[u8]) -> bool {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        match entries.peek(key) {
            Some(expiry) if *expiry > now => true,
            Some(_) => {
                entries.pop(key);
                false
            }
            None => false,
        }
    }

    /// Atomically records `key`. Returns true if it was already live (a replay),
    /// false if this call recorded it.
    pub fn seen_or_record(&self, key: &[u8]) -> bool {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        if let Some(expiry) = entries.get(key)
            && *expiry > now
        {
            return true;
        }
        entries.put(key.to_vec(), now + self.ttl);
        false
    }

    /// Number of stored entries, including ones that expired but were not yet touched.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn guard(capacity: usize) -> (ReplayGuard, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::at_unix(1_000));
        let guard = ReplayGuard::new(capacity, DEFAULT_REPLAY_TTL, clock.clone());
        (guard, clock)
    }

    #[test]
    fn second_record_is_a_replay() {
        let (guard, _) = guard(16);
        assert!(!guard.is_seen(b"sig"));
        assert!(!guard.seen_or_record(b"sig"));
        assert!(guard.is_seen(b"sig"));
        assert!(guard.seen_or_record(b"sig"));
        assert!(!guard.seen_or_record(b"other"));
    }

    #[test]
    fn entries_expire_after_ttl() {
        let (guard, clock) = guard(16);
        guard.seen_or_record(b"sig");

        clock.advance(DEFAULT_REPLAY_TTL - Duration::from_secs(1));
        assert!(guard.is_seen(b"sig"));

        clock.advance(Duration::from_secs(1));
        assert!(!guard.is_seen(b"sig"));
        assert!(!guard.seen_or_record(b"sig"));
        assert!(guard.seen_or_record(b"sig"));
    }

    #[test]
    fn capacity_evicts_least_recently_used() {
        let (guard, _) = guard(2);
        guard.seen_or_record(b"a");
        guard.seen_or_record(b"b");
        // touch "a" so "b" becomes the eviction candidate
        assert!(guard.seen_or_record(b"a"));
        guard.seen_or_record(b"c");

        assert_eq!(guard.len(), 2);
        assert!(guard.is_seen(b"a"));
        assert!(!guard.is_seen(b"b"));
        assert!(guard.is_seen(b"c"));
    }

    #[test]
    fn concurrent_recorders_admit_exactly_one() {
        let (guard, _) = guard(64);
        let guard = Arc::new(guard);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let guard = Arc::clone(&guard);
                std::thread::spawn(move || guard.seen_or_record(b"shared"))
            })
            .collect();

        let fresh = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|replayed| !replayed)
            .count();
        assert_eq!(fresh, 1);
    }
}
