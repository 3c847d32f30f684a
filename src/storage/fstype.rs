//! Filesystem type checks
//!
//! Confirms that a volume path lives on a BeeGFS mount before the driver
//! creates or hands out directories underneath it. The check is a boolean
//! gate: any failure to query the filesystem counts as "not BeeGFS".

use log::{debug, warn};
use std::io;
use std::path::Path;

/// `BEEGFS_MAGIC` as reported in `statfs.f_type`.
pub const BEEGFS_MAGIC: i64 = 0x1983_0326;

/// Source of filesystem type identifiers.
pub trait FilesystemProbe: Send + Sync {
    /// Returns the `f_type` of the filesystem containing `path`.
    fn filesystem_type(&self, path: &Path) -> io::Result<i64>;
}

/// Queries the kernel with statfs(2).
#[derive(Debug, Default, Clone, Copy)]
pub struct StatfsProbe;

impl FilesystemProbe for StatfsProbe {
    #[cfg(target_os = "linux")]
    fn filesystem_type(&self, path: &Path) -> io::Result<i64> {
        let stat = nix::sys::statfs::statfs(path).map_err(io::Error::from)?;
        Ok(stat.filesystem_type().0 as i64)
    }

    #[cfg(not(target_os = "linux"))]
    fn filesystem_type(&self, path: &Path) -> io::Result<i64> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("filesystem type detection unavailable for {}", path.display()),
        ))
    }
}

/// Decides whether a volume path sits on the expected filesystem.
///
/// Never caches: the parent mount can be remounted underneath the driver
/// between two calls.
#[derive(Debug, Clone)]
pub struct FilesystemValidator<P = StatfsProbe> {
    probe: P,
    expected: i64,
}

impl<P: FilesystemProbe> FilesystemValidator<P> {
    pub fn new(probe: P) -> Self {
        Self {
            probe,
            expected: BEEGFS_MAGIC,
        }
    }

    /// Checks the parent directory of `volume_path`.
    ///
    /// The volume directory itself does not have to exist yet. Probe
    /// failures (missing parent, EACCES, EIO) fail closed and return false.
    pub fn is_expected_filesystem(&self, volume_path: &Path) -> bool {
        let parent = parent_dir(volume_path);
        debug!("Checking filesystem type of {}", parent.display());

        match self.probe.filesystem_type(parent) {
            Ok(fs_type) => {
                debug!("Type for {}: {:#x}", parent.display(), fs_type);
                fs_type == self.expected
            }
            Err(e) => {
                warn!(
                    "Could not determine filesystem type for {}: {}",
                    volume_path.display(),
                    e
                );
                false
            }
        }
    }
}

/// Parent directory with `dirname` semantics: "vol" -> ".", "/" -> "/".
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Path::new("."),
        Some(parent) => parent,
        None => path,
    }
}
