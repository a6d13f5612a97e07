//! Pending subsystem activity waiting for a wakeup to explain
//!
//! Activity reports that arrive before the wakeup they caused are parked
//! here, indexed first by subsystem and then by time. Each subsystem has its
//! own timeline and its own retention horizon; a wakeup consumes matching
//! entries so each report is attributed at most once.

use crate::subsystem::SubsystemId;
use crate::timeline::Timeline;
use std::collections::{BTreeSet, HashMap};

/// Deduplicated set of uids
pub type UidSet = BTreeSet<i32>;

/// Subsystem → time-ordered pending uid sets
#[derive(Debug)]
pub struct ActivityHistory {
    /// Retention per subsystem, applied on every insertion
    retention_ms: i64,

    /// Outer entries are never removed once created, only pruned
    by_subsystem: HashMap<SubsystemId, Timeline<UidSet>>,
}

impl ActivityHistory {
    pub fn new(retention_ms: i64) -> Self {
        Self {
            retention_ms,
            by_subsystem: HashMap::new(),
        }
    }

    /// Merge `uids` into the pending entry at (`subsystem`, `elapsed`)
    ///
    /// Entries of the same subsystem older than the retention horizon
    /// relative to `elapsed` are dropped; the new entry itself never is.
    pub fn record(&mut self, subsystem: SubsystemId, elapsed: i64, uids: impl IntoIterator<Item = i32>) {
        let history = self.by_subsystem.entry(subsystem).or_default();
        history.get_or_insert_with(elapsed, UidSet::new).extend(uids);

        let evicted = history.evict_through(elapsed.saturating_sub(self.retention_ms));
        if evicted > 0 {
            tracing::debug!(
                "Evicted {} stale activity entries for {} (retention {}ms)",
                evicted,
                subsystem,
                self.retention_ms
            );
        }
    }

    /// Remove and union every entry of `subsystem` with `lo ≤ elapsed ≤ hi`
    pub fn take_between(&mut self, subsystem: SubsystemId, lo: i64, hi: i64) -> UidSet {
        let Some(history) = self.by_subsystem.get_mut(&subsystem) else {
            return UidSet::new();
        };
        history
            .remove_range_inclusive(lo, hi)
            .into_iter()
            .flat_map(|(_, uids)| uids)
            .collect()
    }

    /// Prune every subsystem's entries with elapsed ≤ `cutoff`
    pub fn evict_all_before(&mut self, cutoff: i64) -> usize {
        self.by_subsystem
            .values_mut()
            .map(|history| history.evict_through(cutoff))
            .sum()
    }

    /// Pending uid set at an exact (subsystem, time), if any
    pub fn get(&self, subsystem: SubsystemId, elapsed: i64) -> Option<&UidSet> {
        self.by_subsystem.get(&subsystem)?.get(elapsed)
    }

    /// Total pending entries across all subsystems
    pub fn pending_count(&self) -> usize {
        self.by_subsystem.values().map(Timeline::len).sum()
    }

    /// Number of subsystems that have ever reported activity
    pub fn subsystem_count(&self) -> usize {
        self.by_subsystem.len()
    }
}
