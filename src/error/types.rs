//! Error types
//!
//! Defines the failures a volume operation can report back to the orchestrator.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Volume operation errors
#[derive(Debug)]
pub enum VolumeError {
    /// The parent of the target path is not on a BeeGFS mount.
    NotOnExpectedFilesystem { action: &'static str, path: PathBuf },
    /// Something other than a directory occupies the target path.
    PathConflict(PathBuf),
    UnknownVolume(String),
    InvalidName(String),
    InvalidRoot(String),
    Io(io::Error),
}

impl fmt::Display for VolumeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolumeError::NotOnExpectedFilesystem { action, path } => write!(
                f,
                "Cannot {} volume {} as it's not on a BeeGFS filesystem",
                action,
                path.display()
            ),
            VolumeError::PathConflict(p) => {
                write!(f, "{} already exists and is not a directory", p.display())
            }
            VolumeError::UnknownVolume(name) => write!(f, "volume {} unknown", name),
            VolumeError::InvalidName(name) => write!(f, "Invalid volume name: {:?}", name),
            VolumeError::InvalidRoot(root) => {
                write!(f, "Invalid volume root (must be absolute): {:?}", root)
            }
            VolumeError::Io(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for VolumeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VolumeError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for VolumeError {
    fn from(error: io::Error) -> Self {
        VolumeError::Io(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filesystem_message_names_action_and_path() {
        let err = VolumeError::NotOnExpectedFilesystem {
            action: "mount",
            path: PathBuf::from("/tmp/vol1"),
        };
        assert_eq!(
            err.to_string(),
            "Cannot mount volume /tmp/vol1 as it's not on a BeeGFS filesystem"
        );
    }

    #[test]
    fn test_io_error_keeps_native_message() {
        let inner = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
        let err = VolumeError::from(inner);
        assert_eq!(err.to_string(), "permission denied");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_unknown_volume_message() {
        let err = VolumeError::UnknownVolume("vol2".into());
        assert_eq!(err.to_string(), "volume vol2 unknown");
    }
}
