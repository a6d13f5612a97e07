//! Offline replay of recorded wakeup/activity traces
//!
//! Traces are JSON lines, one event per line:
//!
//! ```text
//! {"type":"wakeup","elapsed":1000,"uptime":900,"reason":"200 alarm_device"}
//! {"type":"activity","subsystem":1,"elapsed":1200,"uids":[1000,2000]}
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. Events are fed to
//! the engine in file order; wakeups must already be in non-decreasing
//! `elapsed` order, as they would be from a live reporter.

use crate::engine::{ActivityOutcome, AttributionEngine, WakeupOutcome};
use crate::error::{DespertarError, Result};
use crate::subsystem::SubsystemId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A single recorded input to the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceEvent {
    Wakeup {
        elapsed: i64,
        #[serde(default)]
        uptime: i64,
        reason: String,
    },
    Activity {
        subsystem: SubsystemId,
        elapsed: i64,
        #[serde(default)]
        uids: Vec<i32>,
    },
}

/// Read a JSON-lines trace
pub fn read_trace<R: BufRead>(reader: R) -> Result<Vec<TraceEvent>> {
    let mut events = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let event = serde_json::from_str(trimmed).map_err(|e| DespertarError::Trace {
            line: idx + 1,
            message: e.to_string(),
        })?;
        events.push(event);
    }
    Ok(events)
}

/// Read a JSON-lines trace from a file
pub fn read_trace_file<P: AsRef<Path>>(path: P) -> Result<Vec<TraceEvent>> {
    let file = File::open(path.as_ref())?;
    read_trace(BufReader::new(file))
}

/// Counts of what happened during a replay
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    pub wakeups: usize,
    pub unsupported_wakeups: usize,
    pub activities: usize,
    pub matched_activities: usize,
    pub pending_activities: usize,
}

impl fmt::Display for ReplaySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} wakeups ({} unsupported), {} activities ({} matched on arrival, {} pending)",
            self.wakeups,
            self.unsupported_wakeups,
            self.activities,
            self.matched_activities,
            self.pending_activities
        )
    }
}

/// Feed events to the engine in order
pub fn replay<I>(engine: &AttributionEngine, events: I) -> ReplaySummary
where
    I: IntoIterator<Item = TraceEvent>,
{
    let mut summary = ReplaySummary::default();
    let mut last_wakeup: Option<i64> = None;

    for event in events {
        match event {
            TraceEvent::Wakeup {
                elapsed,
                uptime,
                reason,
            } => {
                if let Some(previous) = last_wakeup.filter(|&previous| elapsed < previous) {
                    tracing::warn!(
                        "Wakeup at {} reported after wakeup at {}; correlation may be degraded",
                        elapsed,
                        previous
                    );
                }
                last_wakeup = Some(elapsed);

                summary.wakeups += 1;
                if engine.record_wakeup(elapsed, uptime, &reason) == WakeupOutcome::Unsupported {
                    summary.unsupported_wakeups += 1;
                }
            }
            TraceEvent::Activity {
                subsystem,
                elapsed,
                uids,
            } => {
                summary.activities += 1;
                match engine.record_activity(subsystem, elapsed, &uids) {
                    ActivityOutcome::Matched { .. } => summary.matched_activities += 1,
                    ActivityOutcome::Pending => summary.pending_activities += 1,
                }
            }
        }
    }

    summary
}
