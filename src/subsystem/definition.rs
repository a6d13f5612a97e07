use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical source of wake-causing activity
///
/// Ids are an open space: a resolver may hand back ids this crate has never
/// heard of. Only [`SubsystemId::UNKNOWN`] is reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubsystemId(pub i32);

impl SubsystemId {
    /// Devices that resolve to no known subsystem
    pub const UNKNOWN: SubsystemId = SubsystemId(-1);
    pub const ALARM: SubsystemId = SubsystemId(1);
    pub const WIFI: SubsystemId = SubsystemId(2);
    pub const SOUND_TRIGGER: SubsystemId = SubsystemId(3);
    pub const SENSOR: SubsystemId = SubsystemId(4);
    pub const CELLULAR_DATA: SubsystemId = SubsystemId(5);

    pub fn is_unknown(self) -> bool {
        self == Self::UNKNOWN
    }

    /// Name for the well-known ids, `None` for everything else
    pub fn well_known_name(self) -> Option<&'static str> {
        match self {
            Self::UNKNOWN => Some("Unknown"),
            Self::ALARM => Some("Alarm"),
            Self::WIFI => Some("Wifi"),
            Self::SOUND_TRIGGER => Some("Sound_trigger"),
            Self::SENSOR => Some("Sensor"),
            Self::CELLULAR_DATA => Some("Cellular_data"),
            _ => None,
        }
    }
}

impl fmt::Display for SubsystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.well_known_name() {
            Some(name) => f.write_str(name),
            None => write!(f, "Subsystem({})", self.0),
        }
    }
}

impl From<i32> for SubsystemId {
    fn from(id: i32) -> Self {
        SubsystemId(id)
    }
}

/// One subsystem entry of the static device table
///
/// # Example TOML
/// ```toml
/// [[subsystem]]
/// name = "Wifi"
/// id = 2
/// description = "Wireless LAN interrupts"
/// devices = ["wlan", "wlan_pci"]
/// ```
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SubsystemDefinition {
    /// Unique subsystem name (e.g., "Alarm", "Wifi")
    pub name: String,

    /// Unique subsystem id reported by activity callers
    pub id: SubsystemId,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Kernel device names that wake the CPU for this subsystem
    pub devices: Vec<String>,
}

impl SubsystemDefinition {
    pub fn claims(&self, device: &str) -> bool {
        self.devices.iter().any(|d| d == device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_known_display() {
        assert_eq!(SubsystemId::ALARM.to_string(), "Alarm");
        assert_eq!(SubsystemId::UNKNOWN.to_string(), "Unknown");
        assert_eq!(SubsystemId(42).to_string(), "Subsystem(42)");
    }

    #[test]
    fn test_unknown_sentinel() {
        assert!(SubsystemId(-1).is_unknown());
        assert!(!SubsystemId::WIFI.is_unknown());
    }

    #[test]
    fn test_ordering_is_numeric() {
        assert!(SubsystemId::UNKNOWN < SubsystemId::ALARM);
        assert!(SubsystemId::ALARM < SubsystemId::WIFI);
    }

    #[test]
    fn test_claims() {
        let def = SubsystemDefinition {
            name: "Wifi".to_string(),
            id: SubsystemId::WIFI,
            description: String::new(),
            devices: vec!["wlan".to_string(), "wlan_pci".to_string()],
        };
        assert!(def.claims("wlan_pci"));
        assert!(!def.claims("wlan_pc"));
    }
}
