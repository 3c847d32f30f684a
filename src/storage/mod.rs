//! Cluster filesystem storage
//!
//! Filesystem-type checks, directory provisioning, and path validation.

pub mod filesystem;
pub mod fstype;
pub mod validation;

pub use filesystem::ensure_directory;
pub use fstype::{BEEGFS_MAGIC, FilesystemProbe, FilesystemValidator, StatfsProbe};
pub use validation::{resolve_root, validate_volume_name, volume_path};
