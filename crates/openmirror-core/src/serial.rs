//! Resolving a configuration path to a device serial and base directory.
//!
//! The trailing path component, stripped of a recognized configuration-file
//! suffix, is the device serial identifier. The original interface resolved
//! it by temporarily chdir-ing into the path's directory; here the directory
//! is made absolute against the current working directory (read once, never
//! mutated) and handed to the transport explicitly.

use crate::error::{MirrorError, MirrorResult};
use std::path::{Path, PathBuf};

/// Recognized configuration-file suffix, matched ASCII case-insensitively.
pub const CONFIG_SUFFIX: &str = ".acfg";

/// Longest accepted device path, matching the platform path limit.
pub const MAX_PATH_LEN: usize = 4096;

/// Where one device lives: the serial identifier plus the directory its
/// configuration resolves against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceLocation {
    pub base_dir: PathBuf,
    pub serial: String,
}

/// Splits a device configuration path into a [`DeviceLocation`].
///
/// Fails with `InvalidArgument` for an empty path, an over-long path, or a
/// path with no usable trailing component. Reading the current working
/// directory can fail with `Io`; that is fatal to the open, since the
/// resolution base would be indeterminate.
pub fn resolve(path: &str) -> MirrorResult<DeviceLocation> {
    if path.is_empty() {
        return Err(MirrorError::InvalidArgument(
            "device path is empty".to_string(),
        ));
    }
    if path.len() > MAX_PATH_LEN {
        return Err(MirrorError::InvalidArgument(format!(
            "device path exceeds {MAX_PATH_LEN} bytes"
        )));
    }

    let path = Path::new(path);
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            MirrorError::InvalidArgument("device path has no trailing component".to_string())
        })?;

    let serial = strip_config_suffix(name);
    if serial.is_empty() {
        return Err(MirrorError::InvalidArgument(format!(
            "no serial identifier left in {name:?}"
        )));
    }

    let base_dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            if parent.is_absolute() {
                parent.to_path_buf()
            } else {
                std::env::current_dir()?.join(parent)
            }
        }
        _ => std::env::current_dir()?,
    };

    Ok(DeviceLocation {
        base_dir,
        serial: serial.to_string(),
    })
}

fn strip_config_suffix(name: &str) -> &str {
    // The cut point is only a char boundary when the tail is really the
    // ASCII suffix; non-ASCII names pass through untouched.
    if name.len() >= CONFIG_SUFFIX.len() {
        let cut = name.len() - CONFIG_SUFFIX.len();
        if name.is_char_boundary(cut) {
            let (stem, tail) = name.split_at(cut);
            if tail.eq_ignore_ascii_case(CONFIG_SUFFIX) {
                return stem;
            }
        }
    }
    name
}
