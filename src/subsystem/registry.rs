use crate::error::{DespertarError, Result};
use crate::reason_parser::DeviceMention;
use crate::subsystem::{SubsystemDefinition, SubsystemId};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::Path;

/// Maps a kernel device name to the subsystems it wakes the CPU for
///
/// The engine treats resolution as pure: an empty result means the device is
/// unknown, which the engine records as [`SubsystemId::UNKNOWN`].
pub trait SubsystemResolver: Send + Sync {
    fn resolve(&self, device: &str) -> Vec<SubsystemId>;

    /// Display name used in diagnostics
    fn subsystem_name(&self, id: SubsystemId) -> String {
        id.to_string()
    }
}

impl<F> SubsystemResolver for F
where
    F: Fn(&str) -> Vec<SubsystemId> + Send + Sync,
{
    fn resolve(&self, device: &str) -> Vec<SubsystemId> {
        self(device)
    }
}

/// Static device → subsystem table loaded from TOML configuration
///
/// # Example Usage
/// ```no_run
/// use despertar::subsystem::{SubsystemResolver, SubsystemTable};
///
/// let table = SubsystemTable::from_toml("subsystems.toml")?;
/// for id in table.resolve("wlan_pci") {
///     println!("wlan_pci -> {}", id);
/// }
/// # Ok::<(), despertar::error::DespertarError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SubsystemTable {
    /// All defined subsystems
    subsystems: Vec<SubsystemDefinition>,

    /// Fast lookup: device name → subsystem ids, in table order
    device_to_subsystems: HashMap<String, Vec<SubsystemId>>,
}

impl SubsystemTable {
    /// Load the table from a TOML file
    ///
    /// # Errors
    /// Returns error if the file can't be read, isn't valid TOML, reuses a
    /// subsystem id or name, or claims the reserved UNKNOWN id.
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Parse the table from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        #[derive(serde::Deserialize)]
        struct SubsystemFile {
            #[serde(default)]
            subsystem: Vec<SubsystemDefinition>,
        }

        let file: SubsystemFile = toml::from_str(content)?;
        Self::from_definitions(file.subsystem)
    }

    /// Default table embedded at compile time
    pub fn default_table() -> Result<Self> {
        const DEFAULT_TOML: &str = include_str!("../../subsystems-default.toml");
        Self::from_toml_str(DEFAULT_TOML)
    }

    /// Build a table from already-parsed definitions
    pub fn from_definitions(definitions: Vec<SubsystemDefinition>) -> Result<Self> {
        let mut seen_ids = HashSet::new();
        let mut seen_names = HashSet::new();
        let mut device_to_subsystems: HashMap<String, Vec<SubsystemId>> = HashMap::new();

        for subsystem in &definitions {
            if subsystem.id.is_unknown() {
                return Err(DespertarError::ReservedSubsystem(subsystem.name.clone()));
            }
            if !seen_ids.insert(subsystem.id) {
                return Err(DespertarError::DuplicateSubsystem {
                    what: "id",
                    value: subsystem.id.0.to_string(),
                });
            }
            if !seen_names.insert(subsystem.name.as_str()) {
                return Err(DespertarError::DuplicateSubsystem {
                    what: "name",
                    value: subsystem.name.clone(),
                });
            }

            for device in &subsystem.devices {
                let ids = device_to_subsystems.entry(device.clone()).or_default();
                if !ids.contains(&subsystem.id) {
                    ids.push(subsystem.id);
                }
            }
        }

        Ok(Self {
            subsystems: definitions,
            device_to_subsystems,
        })
    }

    /// Get all defined subsystems
    pub fn subsystems(&self) -> &[SubsystemDefinition] {
        &self.subsystems
    }

    /// Get a subsystem definition by id
    pub fn get(&self, id: SubsystemId) -> Option<&SubsystemDefinition> {
        self.subsystems.iter().find(|s| s.id == id)
    }

    /// Display name for an id: the table's name, else the built-in name
    pub fn name_of(&self, id: SubsystemId) -> String {
        self.get(id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| id.to_string())
    }
}

impl SubsystemResolver for SubsystemTable {
    fn resolve(&self, device: &str) -> Vec<SubsystemId> {
        self.device_to_subsystems
            .get(device)
            .cloned()
            .unwrap_or_default()
    }

    fn subsystem_name(&self, id: SubsystemId) -> String {
        self.name_of(id)
    }
}

/// Derive the subsystem set a wakeup implicates
///
/// Returns `None` when there are no device mentions (the wakeup is not
/// eligible for attribution). Every device that resolves to nothing adds
/// [`SubsystemId::UNKNOWN`] rather than being dropped.
pub fn resolve_subsystems(
    devices: &[DeviceMention],
    resolver: &dyn SubsystemResolver,
) -> Option<BTreeSet<SubsystemId>> {
    if devices.is_empty() {
        return None;
    }

    let mut subsystems = BTreeSet::new();
    for mention in devices {
        let resolved = resolver.resolve(&mention.device);
        if resolved.is_empty() {
            subsystems.insert(SubsystemId::UNKNOWN);
        } else {
            subsystems.extend(resolved);
        }
    }
    Some(subsystems)
}
