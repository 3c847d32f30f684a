//! File system operations
//!
//! Provisions volume directories on the cluster filesystem.

use log::info;
use std::fs::{self, DirBuilder};
use std::io::ErrorKind;
use std::os::unix::fs::DirBuilderExt;
use std::path::Path;

use crate::error::VolumeError;

/// Mode for newly created volume directories and missing ancestors
pub const VOLUME_DIR_MODE: u32 = 0o755;

/// Make sure `path` exists as a directory, creating missing ancestors.
///
/// Uses lstat, so a symlink occupying the name counts as a conflict even if
/// it points at a directory.
pub fn ensure_directory(path: &Path) -> Result<(), VolumeError> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(VolumeError::PathConflict(path.to_path_buf())),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            DirBuilder::new()
                .recursive(true)
                .mode(VOLUME_DIR_MODE)
                .create(path)?;
            info!("Created volume directory {}", path.display());
            Ok(())
        }
        Err(e) => Err(VolumeError::from(e)),
    }
}
