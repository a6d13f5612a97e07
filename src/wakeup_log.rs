//! Retention-bounded log of parsed wakeups

use crate::reason_parser::{parse_wakeup_reason, DeviceMention};
use crate::timeline::Timeline;
use serde::Serialize;

/// A single CPU wakeup, parsed once on ingestion and never mutated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WakeupRecord {
    /// Elapsed realtime in milliseconds (correlation clock)
    pub elapsed: i64,
    /// Uptime in milliseconds (diagnostic only)
    pub uptime: i64,
    /// Reason string exactly as reported
    pub raw_reason: String,
    /// Devices named by the reason, empty if unsupported
    pub devices: Vec<DeviceMention>,
}

impl WakeupRecord {
    /// Parse `raw_reason` into a record
    pub fn parse(elapsed: i64, uptime: i64, raw_reason: &str) -> Self {
        Self {
            elapsed,
            uptime,
            raw_reason: raw_reason.to_string(),
            devices: parse_wakeup_reason(raw_reason).into_devices(),
        }
    }

    /// Whether this wakeup is eligible for attribution at all
    pub fn is_supported(&self) -> bool {
        !self.devices.is_empty()
    }
}

/// Time-ordered store of wakeups, one per elapsed timestamp
#[derive(Debug, Default)]
pub struct WakeupLog {
    records: Timeline<WakeupRecord>,
}

impl WakeupLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record at its elapsed time, returning any record it replaced
    pub fn insert(&mut self, record: WakeupRecord) -> Option<WakeupRecord> {
        let elapsed = record.elapsed;
        let replaced = self.records.insert(elapsed, record);
        if replaced.is_some() {
            tracing::debug!("Wakeup at {} replaced an earlier wakeup at the same time", elapsed);
        }
        replaced
    }

    pub fn get(&self, elapsed: i64) -> Option<&WakeupRecord> {
        self.records.get(elapsed)
    }

    /// Wakeups with `lo ≤ elapsed ≤ hi`, oldest first
    pub fn range_inclusive(&self, lo: i64, hi: i64) -> impl Iterator<Item = &WakeupRecord> {
        self.records.range_inclusive(lo, hi).map(|(_, r)| r)
    }

    /// Drop every wakeup with elapsed ≤ `cutoff`
    pub fn evict_through(&mut self, cutoff: i64) -> usize {
        self.records.evict_through(cutoff)
    }

    pub fn closest_index_at_or_before(&self, t: i64) -> Option<usize> {
        self.records.closest_index_at_or_before(t)
    }

    pub fn closest_index_at_or_after(&self, t: i64) -> Option<usize> {
        self.records.closest_index_at_or_after(t)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All wakeups, newest first
    pub fn iter_rev(&self) -> impl Iterator<Item = &WakeupRecord> {
        self.records.iter_rev().map(|(_, r)| r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_supported_record() {
        let record = WakeupRecord::parse(1000, 900, "200 alarm_device");
        assert!(record.is_supported());
        assert_eq!(record.devices, vec![DeviceMention::new(200, "alarm_device")]);
        assert_eq!(record.raw_reason, "200 alarm_device");
        assert_eq!(record.uptime, 900);
    }

    #[test]
    fn test_parse_abort_record_unsupported() {
        let record = WakeupRecord::parse(1000, 900, "Abort: x");
        assert!(!record.is_supported());
        assert!(record.devices.is_empty());
    }

    #[test]
    fn test_range_and_eviction() {
        let mut log = WakeupLog::new();
        for t in [100, 200, 300, 400] {
            log.insert(WakeupRecord::parse(t, t, "1 rtc0"));
        }

        let times: Vec<i64> = log.range_inclusive(150, 300).map(|r| r.elapsed).collect();
        assert_eq!(times, vec![200, 300]);

        assert_eq!(log.evict_through(200), 2);
        assert_eq!(log.len(), 2);
        assert!(log.get(200).is_none());
        assert!(log.get(300).is_some());
    }

    #[test]
    fn test_same_time_replaces() {
        let mut log = WakeupLog::new();
        assert!(log.insert(WakeupRecord::parse(100, 1, "1 rtc0")).is_none());
        let replaced = log.insert(WakeupRecord::parse(100, 2, "2 wlan"));
        assert_eq!(replaced.map(|r| r.uptime), Some(1));
        assert_eq!(log.len(), 1);
        assert_eq!(log.get(100).map(|r| r.uptime), Some(2));
    }

    #[test]
    fn test_iter_rev_newest_first() {
        let mut log = WakeupLog::new();
        for t in [5, 1, 3] {
            log.insert(WakeupRecord::parse(t, t, "1 rtc0"));
        }
        let times: Vec<i64> = log.iter_rev().map(|r| r.elapsed).collect();
        assert_eq!(times, vec![5, 3, 1]);
        assert_eq!(log.closest_index_at_or_before(4), Some(1));
        assert_eq!(log.closest_index_at_or_after(4), Some(2));
    }
}
