//! Time-indexed sparse storage
//!
//! Every store in the engine is a map from a millisecond timestamp to a value
//! that is queried by time window and evicted from the oldest end. A sorted
//! ring buffer with binary search fits that access pattern: windowed scans
//! are a contiguous index range, and eviction pops from the front in O(k)
//! for k evicted entries. Mid-sequence inserts shift the shorter side.
//!
//! # Design
//!
//! ```text
//!  index:     0      1      2      3      4
//!  time:    [100]  [250]  [300]  [900]  [1400]
//!                    ▲                     ▲
//!   closest_index_at_or_after(200)   closest_index_at_or_before(1500)
//! ```

use std::collections::VecDeque;
use std::ops::Range;

/// Sorted map from timestamp (milliseconds) to value, one value per timestamp
#[derive(Debug, Clone)]
pub struct Timeline<V> {
    entries: VecDeque<(i64, V)>,
}

impl<V> Default for Timeline<V> {
    fn default() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }
}

impl<V> Timeline<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the latest entry with time ≤ `t`
    pub fn closest_index_at_or_before(&self, t: i64) -> Option<usize> {
        let after = self.entries.partition_point(|(time, _)| *time <= t);
        after.checked_sub(1)
    }

    /// Index of the earliest entry with time ≥ `t`
    pub fn closest_index_at_or_after(&self, t: i64) -> Option<usize> {
        let idx = self.entries.partition_point(|(time, _)| *time < t);
        (idx < self.entries.len()).then_some(idx)
    }

    /// Index range covering every entry with `lo ≤ time ≤ hi`
    fn window(&self, lo: i64, hi: i64) -> Range<usize> {
        if lo > hi {
            return 0..0;
        }
        match (
            self.closest_index_at_or_after(lo),
            self.closest_index_at_or_before(hi),
        ) {
            (Some(start), Some(end)) if start <= end => start..end + 1,
            _ => 0..0,
        }
    }

    fn position(&self, t: i64) -> Result<usize, usize> {
        self.entries.binary_search_by_key(&t, |(time, _)| *time)
    }

    /// Insert a value, replacing (and returning) any value at the same time
    pub fn insert(&mut self, t: i64, value: V) -> Option<V> {
        match self.position(t) {
            Ok(idx) => Some(std::mem::replace(&mut self.entries[idx].1, value)),
            Err(idx) => {
                self.entries.insert(idx, (t, value));
                None
            }
        }
    }

    pub fn remove(&mut self, t: i64) -> Option<V> {
        let idx = self.position(t).ok()?;
        self.entries.remove(idx).map(|(_, value)| value)
    }

    pub fn get(&self, t: i64) -> Option<&V> {
        self.position(t).ok().map(|idx| &self.entries[idx].1)
    }

    /// Value at `t`, inserting `make()` first if absent
    pub fn get_or_insert_with(&mut self, t: i64, make: impl FnOnce() -> V) -> &mut V {
        let idx = match self.position(t) {
            Ok(idx) => idx,
            Err(idx) => {
                self.entries.insert(idx, (t, make()));
                idx
            }
        };
        &mut self.entries[idx].1
    }

    /// Entries with `lo ≤ time ≤ hi`, oldest first
    pub fn range_inclusive(&self, lo: i64, hi: i64) -> impl DoubleEndedIterator<Item = (i64, &V)> {
        let range = self.window(lo, hi);
        self.entries.range(range).map(|(t, v)| (*t, v))
    }

    /// Remove and return entries with `lo ≤ time ≤ hi`, oldest first
    pub fn remove_range_inclusive(&mut self, lo: i64, hi: i64) -> Vec<(i64, V)> {
        let range = self.window(lo, hi);
        self.entries.drain(range).collect()
    }

    /// Remove every entry with time ≤ `cutoff`, returning how many were dropped
    pub fn evict_through(&mut self, cutoff: i64) -> usize {
        let mut count = 0;
        while self.entries.front().is_some_and(|(time, _)| *time <= cutoff) {
            self.entries.pop_front();
            count += 1;
        }
        count
    }

    pub fn first_time(&self) -> Option<i64> {
        self.entries.front().map(|(t, _)| *t)
    }

    pub fn last_time(&self) -> Option<i64> {
        self.entries.back().map(|(t, _)| *t)
    }

    /// All entries, oldest first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (i64, &V)> {
        self.entries.iter().map(|(t, v)| (*t, v))
    }

    /// All entries, newest first
    pub fn iter_rev(&self) -> impl Iterator<Item = (i64, &V)> {
        self.iter().rev()
    }
}
