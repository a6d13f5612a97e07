//! Engine configuration: retention horizons and the matching window
//!
//! Defaults are the reference constants: wakeups and attributions are kept
//! for 3 days, pending activity for 3 hours, and an activity matches a wakeup
//! within ±500ms.

use crate::error::{DespertarError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const SECOND_MS: i64 = 1000;
const HOUR_MS: i64 = 60 * 60 * SECOND_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Default retention for wakeups and their attributions (3 days)
pub const DEFAULT_WAKEUP_RETENTION_MS: i64 = 3 * DAY_MS;
/// Default retention for pending activity, per subsystem (3 hours)
pub const DEFAULT_ACTIVITY_RETENTION_MS: i64 = 3 * HOUR_MS;
/// Default correlation half-window (500ms)
pub const DEFAULT_MATCHING_WINDOW_MS: i64 = 500;
/// Default number of wakeups listed in the text dump
pub const DEFAULT_DUMP_LIMIT: usize = 100;

/// Configuration for the attribution engine
///
/// # Example
/// ```
/// use despertar::config::EngineConfig;
///
/// let config = EngineConfig::default().with_matching_window(250);
/// assert_eq!(config.matching_window_ms, 250);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How long wakeups and attributions are kept, relative to the latest wakeup
    pub wakeup_retention_ms: i64,

    /// How long pending activity is kept, per subsystem, relative to the
    /// latest activity of that subsystem
    pub activity_retention_ms: i64,

    /// Symmetric half-window: activity at T' matches a wakeup at T when
    /// |T - T'| ≤ matching_window_ms
    pub matching_window_ms: i64,

    /// Wakeups listed in the text dump, newest first
    pub dump_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            wakeup_retention_ms: DEFAULT_WAKEUP_RETENTION_MS,
            activity_retention_ms: DEFAULT_ACTIVITY_RETENTION_MS,
            matching_window_ms: DEFAULT_MATCHING_WINDOW_MS,
            dump_limit: DEFAULT_DUMP_LIMIT,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_matching_window(mut self, window_ms: i64) -> Self {
        self.matching_window_ms = window_ms;
        self
    }

    pub fn with_wakeup_retention(mut self, retention_ms: i64) -> Self {
        self.wakeup_retention_ms = retention_ms;
        self
    }

    pub fn with_activity_retention(mut self, retention_ms: i64) -> Self {
        self.activity_retention_ms = retention_ms;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.matching_window_ms < 0 {
            return Err(DespertarError::InvalidConfig(format!(
                "matching_window_ms must be >= 0, got {}",
                self.matching_window_ms
            )));
        }

        if self.wakeup_retention_ms <= 0 {
            return Err(DespertarError::InvalidConfig(format!(
                "wakeup_retention_ms must be > 0, got {}",
                self.wakeup_retention_ms
            )));
        }

        if self.activity_retention_ms <= 0 {
            return Err(DespertarError::InvalidConfig(format!(
                "activity_retention_ms must be > 0, got {}",
                self.activity_retention_ms
            )));
        }

        if self.matching_window_ms >= self.wakeup_retention_ms {
            return Err(DespertarError::InvalidConfig(format!(
                "matching_window_ms ({}) must be smaller than wakeup_retention_ms ({})",
                self.matching_window_ms, self.wakeup_retention_ms
            )));
        }

        Ok(())
    }
}
