//! Case-insensitive attribute lookup.
//!
//! The original interface scanned its table linearly with a case-insensitive
//! compare on every call. Here the scan is replaced by a map keyed by the
//! lower-cased name, built once on first use.

use crate::table::{PARAMETERS, ParamDescriptor, ValueKind};
use crate::{RegistryError, RegistryResult};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Handle to one entry of [`PARAMETERS`].
///
/// Only this crate can mint one, so a `ParamId` always names a real entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamId(&'static ParamDescriptor);

fn index_map() -> &'static HashMap<String, &'static ParamDescriptor> {
    static INDEX: OnceLock<HashMap<String, &'static ParamDescriptor>> = OnceLock::new();
    INDEX.get_or_init(|| {
        PARAMETERS
            .iter()
            .map(|entry| (entry.name.to_ascii_lowercase(), entry))
            .collect()
    })
}

/// Looks up an attribute by name, case-insensitively.
///
/// An empty name is always [`RegistryError::NotFound`].
pub fn find(name: &str) -> RegistryResult<ParamId> {
    if name.is_empty() {
        return Err(RegistryError::NotFound(String::new()));
    }
    index_map()
        .get(&name.to_ascii_lowercase())
        .map(|&entry| ParamId(entry))
        .ok_or_else(|| RegistryError::NotFound(name.to_string()))
}

/// Returns the full descriptor for an attribute.
pub fn descriptor(id: ParamId) -> &'static ParamDescriptor {
    id.0
}

/// Returns the value kind of an attribute.
pub fn kind_of(id: ParamId) -> ValueKind {
    id.0.kind
}

/// Fails with [`RegistryError::ReadDenied`] unless the attribute is readable.
pub fn check_readable(id: ParamId) -> RegistryResult<()> {
    let entry = descriptor(id);
    if entry.access.is_readable() {
        Ok(())
    } else {
        Err(RegistryError::ReadDenied { name: entry.name })
    }
}

/// Fails with [`RegistryError::WriteDenied`] unless the attribute is writable.
pub fn check_writable(id: ParamId) -> RegistryResult<()> {
    let entry = descriptor(id);
    if entry.access.is_writable() {
        Ok(())
    } else {
        Err(RegistryError::WriteDenied { name: entry.name })
    }
}
