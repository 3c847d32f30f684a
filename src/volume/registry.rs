//! Module `registry`
//!
//! In-memory bookkeeping of the volumes this driver has created. Maps a
//! volume name to its mount path and the root it was created under.
//!
//! Every method takes the registry lock for its own critical section only;
//! callers never get a reference into the map. Filesystem work happens
//! outside the lock, with [`VolumeRegistry::claim`] keeping two creators of
//! the same name from both provisioning it.

use parking_lot::{Condvar, Mutex};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use crate::volume::results::Volume;

/// A registered volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeEntry {
    pub name: String,
    pub mount_path: PathBuf,
    pub root: PathBuf,
}

impl VolumeEntry {
    pub fn to_volume(&self) -> Volume {
        Volume {
            name: self.name.clone(),
            mountpoint: self.mount_path.clone(),
        }
    }
}

#[derive(Default)]
struct RegistryState {
    volumes: HashMap<String, VolumeEntry>,
    provisioning: HashSet<String>, // names a creator is currently provisioning
}

/// Registry that maps volume names to their mount paths.
#[derive(Default)]
pub struct VolumeRegistry {
    state: Mutex<RegistryState>,
    settled: Condvar,
}

impl VolumeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the entry for `name`.
    pub fn put(&self, name: &str, mount_path: PathBuf, root: PathBuf) {
        let mut state = self.state.lock();
        state.volumes.insert(
            name.to_string(),
            VolumeEntry {
                name: name.to_string(),
                mount_path,
                root,
            },
        );
    }

    /// Returns a copy of the entry for `name`, if registered.
    pub fn get(&self, name: &str) -> Option<VolumeEntry> {
        self.state.lock().volumes.get(name).cloned()
    }

    /// Removes and returns the entry for `name`. Unknown names are ignored.
    pub fn remove(&self, name: &str) -> Option<VolumeEntry> {
        self.state.lock().volumes.remove(name)
    }

    /// Snapshot of every registered volume, ordered by name.
    pub fn list(&self) -> Vec<Volume> {
        let state = self.state.lock();
        let mut volumes: Vec<Volume> = state.volumes.values().map(VolumeEntry::to_volume).collect();
        drop(state);

        volumes.sort_by(|a, b| a.name.cmp(&b.name));
        volumes
    }

    /// Reserves `name` for provisioning.
    ///
    /// Returns `None` when the name is already registered. If another caller
    /// holds a claim on the same name this blocks until that claim is
    /// committed or dropped, then checks again.
    pub fn claim(&self, name: &str) -> Option<ProvisionClaim<'_>> {
        let mut state = self.state.lock();
        loop {
            if state.volumes.contains_key(name) {
                return None;
            }
            if state.provisioning.insert(name.to_string()) {
                return Some(ProvisionClaim {
                    registry: self,
                    name: name.to_string(),
                    committed: false,
                });
            }
            self.settled.wait(&mut state);
        }
    }

    fn settle(&self, name: &str, entry: Option<VolumeEntry>) {
        let mut state = self.state.lock();
        state.provisioning.remove(name);
        if let Some(entry) = entry {
            state.volumes.insert(entry.name.clone(), entry);
        }
        drop(state);

        self.settled.notify_all();
    }
}

/// Exclusive right to provision and register one volume name.
///
/// Dropping the claim without committing releases the name so a waiting
/// creator can try again.
pub struct ProvisionClaim<'a> {
    registry: &'a VolumeRegistry,
    name: String,
    committed: bool,
}

impl ProvisionClaim<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers the volume and wakes any creators waiting on this name.
    pub fn commit(mut self, mount_path: PathBuf, root: PathBuf) {
        let entry = VolumeEntry {
            name: self.name.clone(),
            mount_path,
            root,
        };
        self.committed = true;
        self.registry.settle(&self.name, Some(entry));
    }
}

impl Drop for ProvisionClaim<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.registry.settle(&self.name, None);
        }
    }
}
