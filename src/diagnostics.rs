//! Diagnostic snapshot of the attribution engine
//!
//! A snapshot is captured under the engine lock and is a plain owned value
//! afterwards, so rendering never holds up callers. The text layout is meant
//! for humans and bug reports; the JSON form (via `serde`) is for tooling.

use crate::config::EngineConfig;
use crate::engine::EngineState;
use crate::reason_parser::DeviceMention;
use crate::subsystem::{SubsystemId, SubsystemResolver};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Uids attributed to one subsystem for one wakeup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubsystemAttribution {
    pub subsystem: SubsystemId,
    pub name: String,
    pub uids: Vec<i32>,
}

/// One logged wakeup and what it was attributed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WakeupSnapshot {
    pub elapsed: i64,
    pub uptime: i64,
    pub raw_reason: String,
    pub devices: Vec<DeviceMention>,
    pub supported: bool,
    pub attribution: Vec<SubsystemAttribution>,
}

/// How often a subsystem was implicated and how often it was explained
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubsystemStats {
    pub subsystem: SubsystemId,
    pub name: String,
    /// Wakeups where this subsystem has at least one uid
    pub attributed: usize,
    /// Wakeups that implicated this subsystem
    pub total: usize,
}

/// Point-in-time view of the engine, newest wakeup first
#[derive(Debug, Clone, Serialize)]
pub struct EngineSnapshot {
    pub config: EngineConfig,
    pub wakeups: Vec<WakeupSnapshot>,
    pub stats: Vec<SubsystemStats>,
    pub pending_activity: usize,
}

impl EngineSnapshot {
    pub(crate) fn capture(
        config: &EngineConfig,
        state: &EngineState,
        resolver: &dyn SubsystemResolver,
    ) -> Self {
        let wakeups = state
            .wakeups
            .iter_rev()
            .map(|record| {
                let attribution = state
                    .attributions
                    .entry(record.elapsed)
                    .map(|entry| {
                        entry
                            .iter()
                            .map(|(&subsystem, uids)| SubsystemAttribution {
                                subsystem,
                                name: resolver.subsystem_name(subsystem),
                                uids: uids.iter().copied().collect(),
                            })
                            .collect()
                    })
                    .unwrap_or_default();

                WakeupSnapshot {
                    elapsed: record.elapsed,
                    uptime: record.uptime,
                    raw_reason: record.raw_reason.clone(),
                    devices: record.devices.clone(),
                    supported: record.is_supported(),
                    attribution,
                }
            })
            .collect();

        let mut counts: BTreeMap<SubsystemId, (usize, usize)> = BTreeMap::new();
        for (_, entry) in state.attributions.iter() {
            for (&subsystem, uids) in entry {
                let (attributed, total) = counts.entry(subsystem).or_default();
                *total += 1;
                if !uids.is_empty() {
                    *attributed += 1;
                }
            }
        }

        let stats = counts
            .into_iter()
            .map(|(subsystem, (attributed, total))| SubsystemStats {
                subsystem,
                name: resolver.subsystem_name(subsystem),
                attributed,
                total,
            })
            .collect();

        Self {
            config: config.clone(),
            wakeups,
            stats,
            pending_activity: state.activity.pending_count(),
        }
    }

    /// Render the human-readable dump
    pub fn render_text<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        writeln!(
            out,
            "Wakeup attribution (window ±{}ms, {} wakeups retained, {} pending activity):",
            self.config.matching_window_ms,
            self.wakeups.len(),
            self.pending_activity
        )?;

        writeln!(out, "  Recent wakeups (newest first):")?;
        if self.wakeups.is_empty() {
            writeln!(out, "    <none>")?;
        }
        for wakeup in self.wakeups.iter().take(self.config.dump_limit) {
            writeln!(
                out,
                "    elapsed={} uptime={} reason=\"{}\"",
                wakeup.elapsed, wakeup.uptime, wakeup.raw_reason
            )?;

            if !wakeup.supported {
                writeln!(out, "      unsupported, not attributed")?;
                continue;
            }

            let devices: Vec<String> = wakeup.devices.iter().map(ToString::to_string).collect();
            writeln!(out, "      devices: [{}]", devices.join(", "))?;
            for attribution in &wakeup.attribution {
                writeln!(out, "      {}: {:?}", attribution.name, attribution.uids)?;
            }
        }
        if self.wakeups.len() > self.config.dump_limit {
            writeln!(
                out,
                "    ... {} older wakeups omitted",
                self.wakeups.len() - self.config.dump_limit
            )?;
        }

        writeln!(out, "  Attribution stats:")?;
        if self.stats.is_empty() {
            writeln!(out, "    <none>")?;
        }
        for stat in &self.stats {
            writeln!(
                out,
                "    {}: {} attributed / {} total",
                stat.name, stat.attributed, stat.total
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for EngineSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render_text(f)
    }
}
