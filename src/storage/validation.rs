//! Path validation
//!
//! Derives volume paths from caller input and rejects names that could
//! escape the volume root.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use crate::error::VolumeError;

/// Option key that overrides the default volume root
pub const ROOT_OPTION: &str = "root";

/// A volume name must be exactly one normal path component.
pub fn validate_volume_name(name: &str) -> Result<(), VolumeError> {
    if name.is_empty() || name.contains('\0') || name.contains('/') {
        return Err(VolumeError::InvalidName(name.to_string()));
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(VolumeError::InvalidName(name.to_string())),
    }
}

/// Picks the `root` option if present, otherwise the configured default.
pub fn resolve_root(
    options: &HashMap<String, String>,
    default_root: &Path,
) -> Result<PathBuf, VolumeError> {
    match options.get(ROOT_OPTION) {
        Some(root) if Path::new(root).is_absolute() => Ok(PathBuf::from(root)),
        Some(root) => Err(VolumeError::InvalidRoot(root.clone())),
        None => Ok(default_root.to_path_buf()),
    }
}

/// Deterministic mount path for `name` under `root`.
pub fn volume_path(root: &Path, name: &str) -> Result<PathBuf, VolumeError> {
    validate_volume_name(name)?;
    Ok(root.join(name))
}
