//! Append-only leaderboard with an explicitly invalidated top-N snapshot.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use types::LeaderboardEntry;

use crate::clock::Clock;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);
pub const DEFAULT_LEADERBOARD_SIZE: usize = 10;

/// Cached top-N view and when it was taken.
#[derive(Clone, Debug)]
struct Snapshot {
    entries: Arc<Vec<LeaderboardEntry>>,
    taken_at: Duration,
}

pub struct Leaderboard {
    entries: RwLock<Vec<LeaderboardEntry>>,
    snapshot: Mutex<Option<Snapshot>>,
    cache_ttl: Duration,
    size: usize,
    clock: Arc<dyn Clock>,
}

impl Leaderboard {
    pub fn new(size: usize, cache_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            snapshot: Mutex::new(None),
            cache_ttl,
            size,
            clock,
        }
    }

    /// Appends an entry. Does not touch the snapshot; see [`Leaderboard::invalidate`].
    pub fn record(&self, entry: LeaderboardEntry) {
        self.entries.write().push(entry);
    }

    /// Drops the cached snapshot so the next read recomputes it.
    pub fn invalidate(&self) {
        *self.snapshot.lock() = None;
    }

    /// Highest scores first, at most `size` entries.
    ///
    /// Served from the snapshot while it is younger than the cache TTL. Equal
    /// scores keep insertion order.
    pub fn top(&self) -> Arc<Vec<LeaderboardEntry>> {
        let now = self.clock.now();
        let mut snapshot = self.snapshot.lock();

        if let Some(cached) = snapshot.as_ref()
            && now.saturating_sub(cached.taken_at) < self.cache_ttl
        {
            return Arc::clone(&cached.entries);
        }

        let mut ranked = self.entries.read().clone();
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked.truncate(self.size);

        let entries = Arc::new(ranked);
        *snapshot = Some(Snapshot {
            entries: Arc::clone(&entries),
            taken_at: now,
        });
        entries
    }

    /// Total number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn entry(name: &str, score: u64) -> LeaderboardEntry {
        LeaderboardEntry {
            name: name.to_string(),
            score,
        }
    }

    fn board() -> (Leaderboard, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::at_unix(10_000));
        let board = Leaderboard::new(DEFAULT_LEADERBOARD_SIZE, DEFAULT_CACHE_TTL, clock.clone());
        (board, clock)
    }

    #[test]
    fn top_is_sorted_descending_and_capped() {
        let (board, _) = board();
        for score in 1..=15 {
            board.record(entry(&format!("p{score}"), score * 7 % 16));
        }

        let top = board.top();
        assert_eq!(top.len(), 10);
        assert!(top.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(top[0].score, 15);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let (board, _) = board();
        board.record(entry("first", 5));
        board.record(entry("second", 5));
        board.record(entry("best", 9));

        let names: Vec<_> = board.top().iter().map(|e| e.name.clone()).collect();
        assert_eq!(names, ["best", "first", "second"]);
    }

    #[test]
    fn snapshot_is_reused_within_ttl() {
        let (board, clock) = board();
        board.record(entry("a", 1));
        let first = board.top();

        // Without invalidation a new entry stays hidden until the TTL elapses.
        board.record(entry("b", 2));
        clock.advance(Duration::from_secs(29));
        let second = board.top();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 1);

        clock.advance(Duration::from_secs(1));
        let third = board.top();
        assert!(!Arc::ptr_eq(&second, &third));
        assert_eq!(third.len(), 2);
    }

    #[test]
    fn invalidate_forces_recompute() {
        let (board, _) = board();
        board.record(entry("a", 1));
        let before = board.top();

        board.record(entry("b", 2));
        board.invalidate();
        let after = board.top();

        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(after[0], entry("b", 2));
        assert_eq!(board.len(), 2);
    }

    #[test]
    fn empty_board_reads_empty() {
        let (board, _) = board();
        assert!(board.top().is_empty());
        assert!(board.is_empty());
    }
}
