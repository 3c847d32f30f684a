pub mod config;
pub mod error;
pub mod protocol;
pub mod server;
pub mod storage;
pub mod utils;
pub mod volume;

pub use config::DriverConfig;
pub use error::VolumeError;
pub use server::Server;
pub use volume::{ServiceSettings, VolumeService};
