//! Volume management
//!
//! The registry of known volumes and the operations the orchestrator calls.

pub mod registry;
pub mod results;
pub mod service;

pub use registry::{ProvisionClaim, VolumeEntry, VolumeRegistry};
pub use results::{Options, Volume};
pub use service::{ServiceSettings, VolumeService};
