//! Volume operations
//!
//! Implements create, remove, path, mount, unmount, get and list on top of
//! the registry, the filesystem type gate and directory provisioning.

use log::{debug, info};
use std::path::PathBuf;

use crate::error::VolumeError;
use crate::storage::{
    FilesystemProbe, FilesystemValidator, StatfsProbe, ensure_directory, resolve_root,
    validate_volume_name, volume_path,
};
use crate::volume::registry::VolumeRegistry;
use crate::volume::results::{Options, Volume};

/// Immutable settings handed to the service at construction.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Root for volumes created without a `root` option
    pub default_root: PathBuf,
    /// Dump the registry after each successful create
    pub verbose: bool,
}

pub struct VolumeService<P = StatfsProbe> {
    registry: VolumeRegistry,
    validator: FilesystemValidator<P>,
    settings: ServiceSettings,
}

impl VolumeService<StatfsProbe> {
    pub fn new(settings: ServiceSettings) -> Self {
        Self::with_probe(settings, StatfsProbe)
    }
}

impl<P: FilesystemProbe> VolumeService<P> {
    pub fn with_probe(settings: ServiceSettings, probe: P) -> Self {
        Self {
            registry: VolumeRegistry::new(),
            validator: FilesystemValidator::new(probe),
            settings,
        }
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    /// Creates the volume directory and registers it.
    ///
    /// Creating a name that is already registered succeeds without touching
    /// the filesystem, so orchestrator retries are harmless.
    pub fn create(&self, name: &str, options: &Options) -> Result<(), VolumeError> {
        info!("Create: {}, {:?}", name, options);

        validate_volume_name(name)?;

        // options only matter for a volume that does not exist yet
        let Some(claim) = self.registry.claim(name) else {
            info!("Volume {} already exists, nothing to create", name);
            return Ok(());
        };

        let root = resolve_root(options, &self.settings.default_root)?;
        let dest = volume_path(&root, name)?;

        if !self.validator.is_expected_filesystem(&dest) {
            return Err(VolumeError::NotOnExpectedFilesystem {
                action: "create",
                path: dest,
            });
        }

        ensure_directory(&dest)?;
        claim.commit(dest, root);

        if self.settings.verbose {
            debug!("Volumes after create: {:#?}", self.registry.list());
        }

        Ok(())
    }

    /// Forgets the volume. The directory and its data are left in place.
    pub fn remove(&self, name: &str) {
        info!("Remove: {}", name);

        if self.registry.remove(name).is_none() {
            debug!("Remove: {} was not registered", name);
        }
    }

    /// Registered mount path, or `None` for an unknown volume.
    pub fn path(&self, name: &str) -> Option<PathBuf> {
        debug!("Path: {}", name);
        self.registry.get(name).map(|entry| entry.mount_path)
    }

    /// Re-checks the filesystem and returns the path to mount.
    ///
    /// Unregistered names get the computed path without being registered,
    /// so Mount can succeed where Get reports the volume as unknown.
    pub fn mount(&self, name: &str, options: &Options) -> Result<PathBuf, VolumeError> {
        info!("Mount: {}", name);

        let target = match self.registry.get(name) {
            Some(entry) => entry.mount_path,
            None => {
                let root = resolve_root(options, &self.settings.default_root)?;
                volume_path(&root, name)?
            }
        };

        if !self.validator.is_expected_filesystem(&target) {
            return Err(VolumeError::NotOnExpectedFilesystem {
                action: "mount",
                path: target,
            });
        }

        Ok(target)
    }

    /// No-op: mounts are not reference counted.
    pub fn unmount(&self, name: &str) {
        info!("Unmount: {}", name);
    }

    pub fn get(&self, name: &str) -> Result<Volume, VolumeError> {
        info!("Get: {}", name);

        self.registry
            .get(name)
            .map(|entry| entry.to_volume())
            .ok_or_else(|| VolumeError::UnknownVolume(name.to_string()))
    }

    pub fn list(&self) -> Vec<Volume> {
        info!("List");
        self.registry.list()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::BEEGFS_MAGIC;
    use std::fs;
    use std::io;
    use std::path::Path;
    use tempfile::TempDir;

    /// Reports BEEGFS_MAGIC for anything under `beegfs`, ext4 elsewhere.
    struct TreeProbe {
        beegfs: PathBuf,
    }

    impl FilesystemProbe for TreeProbe {
        fn filesystem_type(&self, path: &Path) -> io::Result<i64> {
            fs::metadata(path)?;
            if path.starts_with(&self.beegfs) {
                Ok(BEEGFS_MAGIC)
            } else {
                Ok(0xEF53)
            }
        }
    }

    fn setup() -> (TempDir, PathBuf, PathBuf, VolumeService<TreeProbe>) {
        let dir = tempfile::tempdir().unwrap();
        let beegfs = dir.path().join("beegfs");
        let local = dir.path().join("local");
        fs::create_dir(&beegfs).unwrap();
        fs::create_dir(&local).unwrap();

        let service = VolumeService::with_probe(
            ServiceSettings {
                default_root: beegfs.clone(),
                verbose: true,
            },
            TreeProbe {
                beegfs: beegfs.clone(),
            },
        );
        (dir, beegfs, local, service)
    }

    fn root_option(root: &Path) -> Options {
        let mut options = Options::new();
        options.insert("root".into(), root.to_string_lossy().into_owned());
        options
    }

    #[test]
    fn test_create_then_get() {
        let (_dir, beegfs, _local, service) = setup();

        service.create("vol1", &Options::new()).unwrap();

        assert!(beegfs.join("vol1").is_dir());
        let volume = service.get("vol1").unwrap();
        assert_eq!(volume.name, "vol1");
        assert_eq!(volume.mountpoint, beegfs.join("vol1"));
        assert!(matches!(
            service.get("vol2"),
            Err(VolumeError::UnknownVolume(name)) if name == "vol2"
        ));
    }

    #[test]
    fn test_create_is_idempotent() {
        let (_dir, _beegfs, _local, service) = setup();

        service.create("vol1", &Options::new()).unwrap();
        service.create("vol1", &Options::new()).unwrap();

        assert_eq!(service.list().len(), 1);
    }

    #[test]
    fn test_create_retry_ignores_options_of_existing_volume() {
        let (_dir, beegfs, _local, service) = setup();
        service.create("vol1", &Options::new()).unwrap();

        let mut bad_root = Options::new();
        bad_root.insert("root".into(), "relative".into());
        service.create("vol1", &bad_root).unwrap();

        assert_eq!(service.path("vol1"), Some(beegfs.join("vol1")));
        assert_eq!(service.list().len(), 1);
    }

    #[test]
    fn test_create_new_volume_with_relative_root_fails() {
        let (_dir, _beegfs, _local, service) = setup();
        let mut bad_root = Options::new();
        bad_root.insert("root".into(), "relative".into());

        assert!(matches!(
            service.create("vol1", &bad_root),
            Err(VolumeError::InvalidRoot(_))
        ));
        // the failed create released the name
        service.create("vol1", &Options::new()).unwrap();
    }

    #[test]
    fn test_create_off_beegfs_fails_without_side_effects() {
        let (_dir, _beegfs, local, service) = setup();

        let err = service.create("vol1", &root_option(&local)).unwrap_err();

        assert!(matches!(
            err,
            VolumeError::NotOnExpectedFilesystem { action: "create", .. }
        ));
        assert!(service.list().is_empty());
        assert!(!local.join("vol1").exists());
    }

    #[test]
    fn test_failed_create_can_be_retried() {
        let (_dir, beegfs, _local, service) = setup();
        fs::write(beegfs.join("vol1"), b"occupied").unwrap();

        assert!(matches!(
            service.create("vol1", &Options::new()),
            Err(VolumeError::PathConflict(_))
        ));

        fs::remove_file(beegfs.join("vol1")).unwrap();
        service.create("vol1", &Options::new()).unwrap();
        assert!(service.path("vol1").is_some());
    }

    #[test]
    fn test_traversal_name_rejected() {
        let (_dir, _beegfs, _local, service) = setup();

        assert!(matches!(
            service.create("../escape", &Options::new()),
            Err(VolumeError::InvalidName(_))
        ));
        assert!(matches!(
            service.mount("..", &Options::new()),
            Err(VolumeError::InvalidName(_))
        ));
    }

    #[test]
    fn test_remove_keeps_directory() {
        let (_dir, beegfs, _local, service) = setup();
        service.create("vol1", &Options::new()).unwrap();
        fs::write(beegfs.join("vol1/data"), b"keep me").unwrap();

        service.remove("vol1");
        service.remove("vol1");

        assert!(service.path("vol1").is_none());
        assert!(beegfs.join("vol1/data").exists());
    }

    #[test]
    fn test_mount_registered_uses_creation_root() {
        let (dir, _beegfs, _local, service) = setup();
        let other = dir.path().join("beegfs/nested");
        fs::create_dir(&other).unwrap();

        service.create("vol1", &root_option(&other)).unwrap();

        // the root option is not needed again after create
        let mounted = service.mount("vol1", &Options::new()).unwrap();
        assert_eq!(mounted, other.join("vol1"));
        assert_eq!(service.path("vol1"), Some(other.join("vol1")));
    }

    #[test]
    fn test_mount_unregistered_returns_computed_path() {
        let (_dir, beegfs, _local, service) = setup();

        let mounted = service.mount("ghost", &Options::new()).unwrap();

        assert_eq!(mounted, beegfs.join("ghost"));
        assert!(service.get("ghost").is_err());
        assert!(service.path("ghost").is_none());
    }

    #[test]
    fn test_mount_rechecks_filesystem() {
        let (_dir, beegfs, _local, service) = setup();
        service.create("vol1", &Options::new()).unwrap();

        // the cluster mount disappears
        fs::remove_dir(beegfs.join("vol1")).unwrap();
        fs::remove_dir(&beegfs).unwrap();

        assert!(matches!(
            service.mount("vol1", &Options::new()),
            Err(VolumeError::NotOnExpectedFilesystem { action: "mount", .. })
        ));
    }

    #[test]
    fn test_unmount_changes_nothing() {
        let (_dir, _beegfs, _local, service) = setup();
        service.create("vol1", &Options::new()).unwrap();

        service.unmount("vol1");
        service.unmount("unknown");

        assert_eq!(service.list().len(), 1);
    }
}
