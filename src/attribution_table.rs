//! Correlation results keyed by wakeup time

use crate::activity_history::UidSet;
use crate::subsystem::SubsystemId;
use crate::timeline::Timeline;
use std::collections::BTreeMap;

/// Subsystem → uids blamed for one wakeup; an empty set means the subsystem
/// was implicated but nothing has explained it yet
pub type Attribution = BTreeMap<SubsystemId, UidSet>;

/// Time-ordered attribution results, bounded in lockstep with the wakeup log
#[derive(Debug, Default)]
pub struct AttributionTable {
    entries: Timeline<Attribution>,
}

impl AttributionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribution at `elapsed`, created empty if absent
    pub fn get_or_create(&mut self, elapsed: i64) -> &mut Attribution {
        self.entries.get_or_insert_with(elapsed, Attribution::new)
    }

    /// Union `uids` into (`elapsed`, `subsystem`), creating either level if absent
    pub fn put(&mut self, elapsed: i64, subsystem: SubsystemId, uids: impl IntoIterator<Item = i32>) {
        self.get_or_create(elapsed)
            .entry(subsystem)
            .or_default()
            .extend(uids);
    }

    /// Forget the attribution at `elapsed` entirely
    pub fn remove(&mut self, elapsed: i64) -> Option<Attribution> {
        self.entries.remove(elapsed)
    }

    pub fn get(&self, elapsed: i64, subsystem: SubsystemId) -> Option<&UidSet> {
        self.entries.get(elapsed)?.get(&subsystem)
    }

    pub fn entry(&self, elapsed: i64) -> Option<&Attribution> {
        self.entries.get(elapsed)
    }

    /// Drop every attribution with elapsed ≤ `cutoff`
    pub fn evict_through(&mut self, cutoff: i64) -> usize {
        self.entries.evict_through(cutoff)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All attributions, oldest first
    pub fn iter(&self) -> impl Iterator<Item = (i64, &Attribution)> {
        self.entries.iter()
    }
}
