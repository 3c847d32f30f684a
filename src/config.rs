//! Configuration management for the BeeGFS volume driver
//!
//! Settings are read once at startup. Defaults can be overridden by
//! config.toml files and then by `BEEGFS_VOLUME_*` environment variables.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::volume::ServiceSettings;

/// Config files tried in order, later ones override earlier ones. Both optional.
pub const DEFAULT_CONFIG_PATHS: [&str; 2] = [
    "/etc/beegfs-volume/config", // packaged install: /etc/beegfs-volume/config.toml
    "config",                    // local development: ./config.toml
];

pub const ENV_PREFIX: &str = "BEEGFS_VOLUME";

/// Base directory where volumes are created in the cluster. Should match
/// beegfs-mounts.conf.
pub const DEFAULT_ROOT: &str = "/mnt/beegfs";
pub const DEFAULT_SOCKET_PATH: &str = "/run/docker/plugins/beegfs.sock";
const DEFAULT_MAX_CONNECTIONS: i64 = 16;
const DEFAULT_MAX_COMMAND_LENGTH: i64 = 4096;

/// Driver configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DriverConfig {
    /// Default volume root when a request has no `root` option
    /// Environment: BEEGFS_VOLUME_ROOT
    pub root: String,

    /// Debug logging and registry dumps
    /// Environment: BEEGFS_VOLUME_VERBOSE
    pub verbose: bool,

    /// Unix socket the orchestrator connects to
    pub socket_path: String,

    /// Concurrent orchestrator connections
    pub max_connections: usize,

    /// Longest accepted request line, in bytes
    pub max_command_length: usize,
}

impl DriverConfig {
    /// Load configuration from the default locations with environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&DEFAULT_CONFIG_PATHS)
    }

    /// Load configuration from `paths` (extension optional) with environment overrides
    pub fn load_from(paths: &[&str]) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("root", DEFAULT_ROOT)?
            .set_default("verbose", true)?
            .set_default("socket_path", DEFAULT_SOCKET_PATH)?
            .set_default("max_connections", DEFAULT_MAX_CONNECTIONS)?
            .set_default("max_command_length", DEFAULT_MAX_COMMAND_LENGTH)?;

        for path in paths {
            builder = builder.add_source(File::with_name(path).required(false));
        }

        let settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let config: DriverConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.root.is_empty() {
            return Err(ConfigError::Message("root cannot be empty".into()));
        }

        if !Path::new(&self.root).is_absolute() {
            return Err(ConfigError::Message(format!(
                "root must be an absolute path, got {}",
                self.root
            )));
        }

        if self.socket_path.is_empty() {
            return Err(ConfigError::Message("socket_path cannot be empty".into()));
        }

        if self.max_connections == 0 {
            return Err(ConfigError::Message(
                "max_connections must be greater than 0".into(),
            ));
        }

        if self.max_command_length == 0 {
            return Err(ConfigError::Message(
                "max_command_length must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    pub fn root_path(&self) -> PathBuf {
        PathBuf::from(&self.root)
    }

    pub fn socket_path(&self) -> PathBuf {
        PathBuf::from(&self.socket_path)
    }

    /// Settings the volume service needs, detached from the rest of the config
    pub fn service_settings(&self) -> ServiceSettings {
        ServiceSettings {
            default_root: self.root_path(),
            verbose: self.verbose,
        }
    }
}
