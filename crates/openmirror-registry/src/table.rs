//! The static attribute table.
//!
//! Attribute names and semantics follow the ALPAO interface conventions
//! (`NbOfActuator`, `ItfState`, ...). The C-style sentinel terminator of the
//! original interface table is replaced by slice length; uniqueness of names
//! under case-insensitive comparison is enforced by tests.

use serde::{Deserialize, Serialize};

/// Value kind of a device attribute.
///
/// The transport itself only moves raw `f64` scalars (plus a string slot);
/// the kind decides how a raw scalar is converted at the session boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueKind {
    /// Nonzero scalar reads as `true`; writes as 0.0 / 1.0.
    Boolean,
    /// Reads round to the nearest integer; writes as an exact integer.
    Integer,
    /// Raw scalar pass-through.
    Float,
    /// Routed through the transport's set-string operation. No current
    /// entry uses this kind (reserved for future attributes).
    String,
}

/// Access mode of a device attribute.
///
/// The empty mode set does not occur in the table, so it is not representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Access {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl Access {
    /// Whether attributes with this mode may be read back from the device.
    pub fn is_readable(&self) -> bool {
        matches!(self, Access::ReadOnly | Access::ReadWrite)
    }

    /// Whether attributes with this mode may be written to the device.
    pub fn is_writable(&self) -> bool {
        matches!(self, Access::WriteOnly | Access::ReadWrite)
    }
}

/// One entry of the static attribute table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParamDescriptor {
    /// Canonical attribute name. Lookup is case-insensitive.
    pub name: &'static str,
    /// How raw transport scalars convert at the session boundary.
    pub kind: ValueKind,
    /// Permitted access direction.
    pub access: Access,
    /// Human-readable description.
    pub description: &'static str,
}

/// The attribute table. Immutable, process-wide, recompile-time to change.
pub const PARAMETERS: &[ParamDescriptor] = &[
    ParamDescriptor {
        name: "AckTimeout",
        kind: ValueKind::Integer,
        access: Access::ReadWrite,
        description: "Acknowledge timeout of the interface, in milliseconds",
    },
    ParamDescriptor {
        name: "DacReset",
        kind: ValueKind::Boolean,
        access: Access::WriteOnly,
        description: "Reset all DAC outputs to their power-up level",
    },
    ParamDescriptor {
        name: "ItfState",
        kind: ValueKind::Integer,
        access: Access::ReadOnly,
        description: "Interface state (0 = idle, nonzero = busy)",
    },
    ParamDescriptor {
        name: "LogDump",
        kind: ValueKind::Boolean,
        access: Access::WriteOnly,
        description: "Dump the embedded log buffer of the interface",
    },
    ParamDescriptor {
        name: "LogPrintLevel",
        kind: ValueKind::Integer,
        access: Access::ReadWrite,
        description: "Verbosity level of the embedded logger",
    },
    ParamDescriptor {
        name: "NbOfActuator",
        kind: ValueKind::Integer,
        access: Access::ReadOnly,
        description: "Number of actuators of the mirror",
    },
    ParamDescriptor {
        name: "SyncMode",
        kind: ValueKind::Boolean,
        access: Access::WriteOnly,
        description: "Synchronous (blocking) or asynchronous command mode",
    },
    ParamDescriptor {
        name: "Timeout",
        kind: ValueKind::Float,
        access: Access::ReadWrite,
        description: "Communication timeout of the transport, in seconds",
    },
    ParamDescriptor {
        name: "TriggerIn",
        kind: ValueKind::Integer,
        access: Access::ReadWrite,
        description: "External input trigger mode",
    },
    ParamDescriptor {
        name: "UseException",
        kind: ValueKind::Boolean,
        access: Access::ReadWrite,
        description: "Whether the vendor library raises its own exceptions",
    },
    ParamDescriptor {
        name: "VersionInfo",
        kind: ValueKind::Integer,
        access: Access::ReadOnly,
        description: "Packed firmware and library version information",
    },
];

#[cfg(test)]
#[allow(clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_access_modes() {
        assert!(Access::ReadOnly.is_readable());
        assert!(!Access::ReadOnly.is_writable());
        assert!(!Access::WriteOnly.is_readable());
        assert!(Access::WriteOnly.is_writable());
        assert!(Access::ReadWrite.is_readable());
        assert!(Access::ReadWrite.is_writable());
    }

    #[test]
    fn test_table_is_not_empty() {
        assert!(!PARAMETERS.is_empty());
    }

    #[test]
    fn test_names_unique_case_insensitive() {
        let mut seen = HashSet::new();
        for entry in PARAMETERS {
            assert!(
                seen.insert(entry.name.to_ascii_lowercase()),
                "duplicate parameter name (case-insensitive): {}",
                entry.name
            );
        }
    }

    #[test]
    fn test_no_string_kind_entries_yet() {
        // String-kind reads are unsupported at the session boundary; the
        // table must not grow a String entry without implementing them.
        assert!(PARAMETERS.iter().all(|e| e.kind != ValueKind::String));
    }

    #[test]
    fn test_descriptions_present() {
        for entry in PARAMETERS {
            assert!(
                !entry.description.is_empty(),
                "missing description for {}",
                entry.name
            );
        }
    }

    #[test]
    fn test_known_entries() {
        let nb = PARAMETERS
            .iter()
            .find(|e| e.name == "NbOfActuator")
            .expect("NbOfActuator must exist");
        assert_eq!(nb.kind, ValueKind::Integer);
        assert_eq!(nb.access, Access::ReadOnly);

        let itf = PARAMETERS
            .iter()
            .find(|e| e.name == "ItfState")
            .expect("ItfState must exist");
        assert!(!itf.access.is_writable());
    }

    #[test]
    fn test_descriptor_serializes() {
        let json = serde_json::to_value(PARAMETERS[0]).expect("serializable");
        assert_eq!(json["name"], "AckTimeout");
    }
}
