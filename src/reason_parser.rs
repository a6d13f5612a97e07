//! Wakeup reason parsing
//!
//! The kernel reports why the CPU left suspend as a single diagnostic string,
//! one `<irq> <device>` pair per wakeup source, joined by `:`:
//!
//! ```text
//! 170 hlos_irq:171 wlan_pci
//! ```
//!
//! A reason whose first component starts with `Abort` describes an aborted
//! suspend rather than a real wakeup and carries nothing to attribute.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

/// Separator between wakeup sources in a raw reason
pub const REASON_DELIMITER: char = ':';

/// Prefix marking an aborted suspend
pub const ABORT_REASON_PREFIX: &str = "Abort";

fn component_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d+)\s+(\S+)").expect("static regex is valid"))
}

/// One interrupt line and the device that raised it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DeviceMention {
    /// Interrupt line number
    pub irq: i32,
    /// Device name as reported by the kernel (e.g., "wlan_pci")
    pub device: String,
}

impl DeviceMention {
    pub fn new(irq: i32, device: impl Into<String>) -> Self {
        Self {
            irq,
            device: device.into(),
        }
    }
}

impl fmt::Display for DeviceMention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.irq, self.device)
    }
}

/// Outcome of parsing a raw wakeup reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedReason {
    /// At least one well-formed `<irq> <device>` component
    Devices(Vec<DeviceMention>),
    /// Aborted suspend, empty reason, or nothing parseable
    Unsupported,
}

impl ParsedReason {
    /// Device mentions, empty for unsupported reasons
    pub fn into_devices(self) -> Vec<DeviceMention> {
        match self {
            ParsedReason::Devices(devices) => devices,
            ParsedReason::Unsupported => Vec::new(),
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, ParsedReason::Devices(_))
    }
}

/// Parse a raw wakeup reason into its device mentions
///
/// Malformed components are logged and skipped; they never fail the whole
/// reason. If no component yields a device the reason is `Unsupported`.
///
/// # Example
/// ```
/// use despertar::reason_parser::{parse_wakeup_reason, DeviceMention, ParsedReason};
///
/// let parsed = parse_wakeup_reason("170 hlos_irq:171 wlan_pci");
/// assert_eq!(
///     parsed,
///     ParsedReason::Devices(vec![
///         DeviceMention::new(170, "hlos_irq"),
///         DeviceMention::new(171, "wlan_pci"),
///     ])
/// );
///
/// assert_eq!(parse_wakeup_reason("Abort: suspend aborted"), ParsedReason::Unsupported);
/// ```
pub fn parse_wakeup_reason(raw: &str) -> ParsedReason {
    if raw.trim().is_empty() {
        return ParsedReason::Unsupported;
    }

    let mut components = raw.split(REASON_DELIMITER).peekable();
    match components.peek() {
        Some(first) if first.trim_start().starts_with(ABORT_REASON_PREFIX) => {
            return ParsedReason::Unsupported;
        }
        None => return ParsedReason::Unsupported,
        _ => {}
    }

    let mut devices = Vec::new();
    for component in components {
        let component = component.trim();
        let Some(caps) = component_pattern().captures(component) else {
            tracing::warn!("Skipping malformed wakeup reason component '{}'", component);
            continue;
        };

        match caps[1].parse::<i32>() {
            Ok(irq) => devices.push(DeviceMention::new(irq, &caps[2])),
            Err(e) => {
                tracing::warn!(
                    "Skipping wakeup reason component '{}': bad irq '{}': {}",
                    component,
                    &caps[1],
                    e
                );
            }
        }
    }

    if devices.is_empty() {
        ParsedReason::Unsupported
    } else {
        ParsedReason::Devices(devices)
    }
}
