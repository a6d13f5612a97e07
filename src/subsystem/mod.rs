// Subsystem identity and device-name resolution
//
// A wakeup reason names devices ("wlan_pci", "rtc0"); attribution works on
// logical subsystems (Alarm, Wifi, ...). The mapping between the two is a
// static table loaded from TOML, so new devices and new subsystems can be
// added without recompiling. Subsystem ids are an open integer space with a
// single reserved UNKNOWN sentinel for devices nobody claims.

mod definition;
mod registry;

pub use definition::{SubsystemDefinition, SubsystemId};
pub use registry::{resolve_subsystems, SubsystemResolver, SubsystemTable};
