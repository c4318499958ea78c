//! Event buffer: a count- and age-bounded rolling window of scored changes.
//!
//! Entries are ordered by arrival (oldest first). The buffer does no
//! locking; the decision engine serializes all access through its cycle.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use muse_core::ScoredChange;
use tracing::debug;

/// Bounded rolling window of recent scored changes.
#[derive(Debug)]
pub struct EventBuffer {
    entries: VecDeque<ScoredChange>,
    max_count: usize,
    max_age: Duration,
}

impl EventBuffer {
    /// Create an empty buffer with the given bounds.
    pub fn new(max_count: usize, max_age: Duration) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_count),
            max_count,
            max_age,
        }
    }

    /// Append a scored change, evicting the oldest entry past the count cap.
    pub fn push(&mut self, scored: ScoredChange) {
        self.entries.push_back(scored);
        if self.entries.len() > self.max_count {
            let evicted = self.entries.pop_front();
            if let Some(evicted) = evicted {
                debug!(
                    file = %evicted.record.file_name(),
                    "buffer full, evicting oldest change"
                );
            }
        }
    }

    /// Drop entries older than the max age. Returns the number evicted.
    ///
    /// Called before every evaluation and snapshot so the engine never
    /// reasons over stale data.
    pub fn prune(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        while let Some(front) = self.entries.front() {
            if now.duration_since(front.record.timestamp) > self.max_age {
                let _ = self.entries.pop_front();
            } else {
                // Arrival-ordered: once one entry is fresh, the rest are too
                break;
            }
        }
        let evicted = before - self.entries.len();
        if evicted > 0 {
            debug!(evicted, remaining = self.entries.len(), "pruned aged changes");
        }
        evicted
    }

    /// Ordered copy of the retained entries, most recent last.
    pub fn snapshot(&self) -> Vec<ScoredChange> {
        self.entries.iter().cloned().collect()
    }

    /// Sum of all retained entries' scores.
    pub fn total_score(&self) -> u32 {
        self.entries.iter().map(|e| e.score).sum()
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the buffer holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Arrival time of the most recent entry.
    pub fn last_arrival(&self) -> Option<Instant> {
        self.entries.back().map(|e| e.record.timestamp)
    }

    /// Drop all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use muse_core::{ChangeKind, ChangeRecord};
    use proptest::prelude::*;
    use std::collections::BTreeSet;
    use std::path::PathBuf;

    fn scored_at(score: u32, timestamp: Instant) -> ScoredChange {
        ScoredChange {
            record: ChangeRecord {
                path: PathBuf::from("a.py"),
                kind: ChangeKind::Modified,
                line_delta: 1,
                added_symbols: vec![],
                fragment: String::new(),
                timestamp,
            },
            score,
            tags: BTreeSet::new(),
        }
    }

    #[test]
    fn push_appends_and_total_accumulates() {
        let mut buffer = EventBuffer::new(10, Duration::from_secs(120));
        buffer.push(scored_at(2, Instant::now()));
        buffer.push(scored_at(3, Instant::now()));
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.total_score(), 5);
    }

    #[test]
    fn push_past_cap_evicts_oldest() {
        let mut buffer = EventBuffer::new(3, Duration::from_secs(120));
        let now = Instant::now();
        for score in 1..=4 {
            buffer.push(scored_at(score, now));
        }
        assert_eq!(buffer.len(), 3);
        // Entry with score 1 was evicted
        assert_eq!(buffer.total_score(), 2 + 3 + 4);
        assert_eq!(buffer.snapshot()[0].score, 2);
    }

    #[test]
    fn prune_drops_aged_entries() {
        let mut buffer = EventBuffer::new(10, Duration::from_secs(60));
        let old = Instant::now();
        buffer.push(scored_at(5, old));
        buffer.push(scored_at(2, old + Duration::from_secs(90)));

        let evicted = buffer.prune(old + Duration::from_secs(100));
        assert_eq!(evicted, 1);
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.total_score(), 2);
    }

    #[test]
    fn prune_keeps_fresh_entries() {
        let mut buffer = EventBuffer::new(10, Duration::from_secs(60));
        let now = Instant::now();
        buffer.push(scored_at(5, now));
        assert_eq!(buffer.prune(now + Duration::from_secs(30)), 0);
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn snapshot_is_arrival_ordered() {
        let mut buffer = EventBuffer::new(10, Duration::from_secs(120));
        let now = Instant::now();
        buffer.push(scored_at(1, now));
        buffer.push(scored_at(2, now + Duration::from_secs(1)));
        buffer.push(scored_at(3, now + Duration::from_secs(2)));
        let scores: Vec<u32> = buffer.snapshot().iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![1, 2, 3]);
    }

    #[test]
    fn clear_empties_buffer() {
        let mut buffer = EventBuffer::new(10, Duration::from_secs(120));
        buffer.push(scored_at(5, Instant::now()));
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.total_score(), 0);
        assert!(buffer.last_arrival().is_none());
    }

    #[test]
    fn last_arrival_tracks_newest_entry() {
        let mut buffer = EventBuffer::new(10, Duration::from_secs(120));
        let now = Instant::now();
        let later = now + Duration::from_secs(5);
        buffer.push(scored_at(1, now));
        buffer.push(scored_at(1, later));
        assert_eq!(buffer.last_arrival(), Some(later));
    }

    proptest! {
        #[test]
        fn length_never_exceeds_cap(
            scores in proptest::collection::vec(0u32..20, 0..50),
            cap in 1usize..12,
        ) {
            let mut buffer = EventBuffer::new(cap, Duration::from_secs(120));
            let now = Instant::now();
            for score in scores {
                buffer.push(scored_at(score, now));
                prop_assert!(buffer.len() <= cap);
            }
        }

        #[test]
        fn no_retained_entry_exceeds_max_age_after_prune(
            offsets in proptest::collection::vec(0u64..300, 1..40),
            max_age_secs in 1u64..180,
        ) {
            let base = Instant::now();
            let max_age = Duration::from_secs(max_age_secs);
            let mut buffer = EventBuffer::new(64, max_age);

            let mut sorted = offsets;
            sorted.sort_unstable();
            for offset in &sorted {
                buffer.push(scored_at(1, base + Duration::from_secs(*offset)));
            }

            let now = base + Duration::from_secs(*sorted.last().unwrap() + max_age_secs / 2);
            let _ = buffer.prune(now);
            for entry in buffer.snapshot() {
                prop_assert!(now.duration_since(entry.record.timestamp) <= max_age);
            }
        }

        #[test]
        fn total_score_matches_snapshot_sum(
            scores in proptest::collection::vec(0u32..50, 0..30),
        ) {
            let mut buffer = EventBuffer::new(10, Duration::from_secs(120));
            let now = Instant::now();
            for score in scores {
                buffer.push(scored_at(score, now));
            }
            let sum: u32 = buffer.snapshot().iter().map(|e| e.score).sum();
            prop_assert_eq!(buffer.total_score(), sum);
        }
    }
}
