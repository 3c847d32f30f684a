//! Error handlers
//!
//! Maps volume errors onto protocol status codes and logs them.

use crate::error::types::VolumeError;
use crate::protocol::responses;
use log::error;

/// Log a failed volume operation
pub fn handle_error(operation: &str, name: &str, err: &VolumeError) {
    error!("{} {} failed: {}", operation, name, err);
}

/// Convert error to protocol response code
pub fn error_to_status_code(err: &VolumeError) -> u16 {
    match err {
        VolumeError::NotOnExpectedFilesystem { .. } => responses::WRONG_FILESYSTEM,
        VolumeError::PathConflict(_) => responses::PATH_CONFLICT,
        VolumeError::UnknownVolume(_) => responses::UNKNOWN_VOLUME,
        VolumeError::InvalidName(_) | VolumeError::InvalidRoot(_) => responses::SYNTAX_ERROR,
        VolumeError::Io(_) => responses::LOCAL_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_each_error_has_distinct_code() {
        let codes = [
            error_to_status_code(&VolumeError::NotOnExpectedFilesystem {
                action: "create",
                path: PathBuf::from("/tmp/x"),
            }),
            error_to_status_code(&VolumeError::PathConflict(PathBuf::from("/x"))),
            error_to_status_code(&VolumeError::UnknownVolume("x".into())),
            error_to_status_code(&VolumeError::InvalidName("..".into())),
            error_to_status_code(&VolumeError::Io(std::io::Error::other("boom"))),
        ];
        assert_eq!(codes, [550, 553, 554, 501, 451]);
    }
}
