// Wakeup Attribution Engine
//
// Correlates two independent real-time streams:
//   - wakeups:  "the CPU woke at T because of <irq> <device>..."
//   - activity: "subsystem S did work at T' on behalf of uids U"
//
// An activity explains a wakeup when they share a subsystem and
// |T - T'| ≤ W. Either side may arrive first:
//
//   wakeup first:    record_wakeup   → table[T][S] = {}      (resolved)
//                    record_activity → table[T][S] ∪= U      (fast path)
//
//   activity first:  record_activity → history[S][T'] = U    (pending)
//                    record_wakeup   → table[T][S] = take(history[S], T±W)
//
// All three stores live behind one mutex so each call sees a consistent
// cross-store view. Nothing here performs I/O or blocks while holding it.

use crate::activity_history::{ActivityHistory, UidSet};
use crate::attribution_table::{Attribution, AttributionTable};
use crate::config::EngineConfig;
use crate::diagnostics::EngineSnapshot;
use crate::error::Result;
use crate::subsystem::{resolve_subsystems, SubsystemId, SubsystemResolver};
use crate::wakeup_log::{WakeupLog, WakeupRecord};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Result of reporting a wakeup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WakeupOutcome {
    /// Aborted or unparseable reason; not eligible for attribution
    Unsupported,
    /// Reason resolved to subsystems; `attributed` already matched pending activity
    Resolved {
        subsystems: BTreeSet<SubsystemId>,
        attributed: BTreeSet<SubsystemId>,
    },
}

/// Result of reporting subsystem activity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityOutcome {
    /// Merged into the attribution of an already-logged wakeup
    Matched { wakeup_elapsed: i64 },
    /// No wakeup in the window yet; kept pending for a future wakeup
    Pending,
}

/// Mutable state shared by both entry points
#[derive(Debug)]
pub(crate) struct EngineState {
    pub(crate) wakeups: WakeupLog,
    pub(crate) activity: ActivityHistory,
    pub(crate) attributions: AttributionTable,
}

/// Thread-safe wakeup attribution engine
///
/// # Example
/// ```
/// use despertar::config::EngineConfig;
/// use despertar::engine::{ActivityOutcome, AttributionEngine};
/// use despertar::subsystem::{SubsystemId, SubsystemTable};
/// use std::sync::Arc;
///
/// let table = SubsystemTable::default_table()?;
/// let engine = AttributionEngine::new(EngineConfig::default(), Arc::new(table))?;
///
/// engine.record_wakeup(1000, 900, "200 alarm_device");
/// let outcome = engine.record_activity(SubsystemId::ALARM, 1200, &[1000, 2000]);
/// assert_eq!(outcome, ActivityOutcome::Matched { wakeup_elapsed: 1000 });
///
/// let uids = engine.responsible_uids(1000, SubsystemId::ALARM).unwrap();
/// assert_eq!(uids.into_iter().collect::<Vec<_>>(), vec![1000, 2000]);
/// # Ok::<(), despertar::error::DespertarError>(())
/// ```
pub struct AttributionEngine {
    config: EngineConfig,
    resolver: Arc<dyn SubsystemResolver>,
    state: Mutex<EngineState>,
}

impl AttributionEngine {
    /// Create an engine, rejecting configs that fail [`EngineConfig::validate`]
    ///
    /// A zero wakeup retention would evict each wakeup on its own insert, and
    /// a negative window matches nothing.
    pub fn new(config: EngineConfig, resolver: Arc<dyn SubsystemResolver>) -> Result<Self> {
        config.validate()?;
        let activity = ActivityHistory::new(config.activity_retention_ms);
        Ok(Self {
            config,
            resolver,
            state: Mutex::new(EngineState {
                wakeups: WakeupLog::new(),
                activity,
                attributions: AttributionTable::new(),
            }),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Every operation leaves the stores consistent before it can panic, so
    /// a poisoned lock still guards valid data.
    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn window(&self, elapsed: i64) -> (i64, i64) {
        let w = self.config.matching_window_ms;
        (elapsed.saturating_sub(w), elapsed.saturating_add(w))
    }

    /// Record a CPU wakeup and attribute it to any pending activity
    ///
    /// Callers must report wakeups in non-decreasing `elapsed` order; the
    /// engine does not reorder or reject out-of-order input.
    pub fn record_wakeup(&self, elapsed: i64, uptime: i64, raw_reason: &str) -> WakeupOutcome {
        let mut state = self.lock();

        let record = WakeupRecord::parse(elapsed, uptime, raw_reason);
        let subsystems = resolve_subsystems(&record.devices, self.resolver.as_ref());

        if state.wakeups.insert(record).is_some() {
            state.attributions.remove(elapsed);
        }

        let outcome = match subsystems {
            None => {
                tracing::debug!("Wakeup at {} not attributable: '{}'", elapsed, raw_reason);
                WakeupOutcome::Unsupported
            }
            Some(subsystems) => {
                let (lo, hi) = self.window(elapsed);
                let mut attributed = BTreeSet::new();

                for &subsystem in &subsystems {
                    let uids = state.activity.take_between(subsystem, lo, hi);
                    if !uids.is_empty() {
                        tracing::debug!(
                            "Wakeup at {} attributed to {} uids {:?} (pending activity)",
                            elapsed,
                            subsystem,
                            uids
                        );
                        attributed.insert(subsystem);
                    }
                    state.attributions.put(elapsed, subsystem, uids);
                }

                WakeupOutcome::Resolved {
                    subsystems,
                    attributed,
                }
            }
        };

        // No later wakeup can reach activity older than one window back.
        let stale = state
            .activity
            .evict_all_before(elapsed.saturating_sub(self.config.matching_window_ms));

        let cutoff = elapsed.saturating_sub(self.config.wakeup_retention_ms);
        let evicted_wakeups = state.wakeups.evict_through(cutoff);
        state.attributions.evict_through(cutoff);

        if stale > 0 || evicted_wakeups > 0 {
            tracing::debug!(
                "Evicted {} pending activity entries and {} wakeups at {}",
                stale,
                evicted_wakeups,
                elapsed
            );
        }

        outcome
    }

    /// Record uid-attributable activity for a subsystem
    ///
    /// If a logged wakeup within the window implicates `subsystem`, the uids
    /// are merged into the earliest such wakeup's attribution. Otherwise the
    /// activity is kept pending for a future wakeup.
    pub fn record_activity(&self, subsystem: SubsystemId, elapsed: i64, uids: &[i32]) -> ActivityOutcome {
        let mut state = self.lock();
        let (lo, hi) = self.window(elapsed);

        // First match wins; at most one wakeup is expected per window.
        let matched = state
            .wakeups
            .range_inclusive(lo, hi)
            .find(|record| {
                resolve_subsystems(&record.devices, self.resolver.as_ref())
                    .is_some_and(|subsystems| subsystems.contains(&subsystem))
            })
            .map(|record| record.elapsed);

        match matched {
            Some(wakeup_elapsed) => {
                tracing::debug!(
                    "Activity of {} at {} attributed to wakeup at {} uids {:?}",
                    subsystem,
                    elapsed,
                    wakeup_elapsed,
                    uids
                );
                state
                    .attributions
                    .put(wakeup_elapsed, subsystem, uids.iter().copied());
                ActivityOutcome::Matched { wakeup_elapsed }
            }
            None => {
                tracing::trace!("Activity of {} at {} pending", subsystem, elapsed);
                state.activity.record(subsystem, elapsed, uids.iter().copied());
                ActivityOutcome::Pending
            }
        }
    }

    /// Attribution of the wakeup at `elapsed`, if it was attributable
    pub fn attribution_at(&self, elapsed: i64) -> Option<Attribution> {
        self.lock().attributions.entry(elapsed).cloned()
    }

    /// Uids blamed on `subsystem` for the wakeup at `elapsed`
    pub fn responsible_uids(&self, elapsed: i64, subsystem: SubsystemId) -> Option<UidSet> {
        self.lock().attributions.get(elapsed, subsystem).cloned()
    }

    /// The logged wakeup at `elapsed`
    pub fn wakeup_at(&self, elapsed: i64) -> Option<WakeupRecord> {
        self.lock().wakeups.get(elapsed).cloned()
    }

    pub fn wakeup_count(&self) -> usize {
        self.lock().wakeups.len()
    }

    pub fn attribution_count(&self) -> usize {
        self.lock().attributions.len()
    }

    pub fn pending_activity_count(&self) -> usize {
        self.lock().activity.pending_count()
    }

    /// Consistent read-only view of the engine for diagnostics
    pub fn snapshot(&self) -> EngineSnapshot {
        let state = self.lock();
        EngineSnapshot::capture(&self.config, &state, self.resolver.as_ref())
    }

    /// Write the human-readable diagnostic dump
    pub fn dump<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        self.snapshot().render_text(out)
    }
}

impl fmt::Debug for AttributionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("AttributionEngine")
            .field("config", &self.config)
            .field("wakeups", &state.wakeups.len())
            .field("attributions", &state.attributions.len())
            .field("pending_activity", &state.activity.pending_count())
            .finish()
    }
}
