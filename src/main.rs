//! BeeGFS volume driver - Entry Point
//!
//! Hands out directories on a BeeGFS mount as named volumes to a container
//! orchestrator over a Unix socket.

use log::{error, info};
use std::process::ExitCode;
use std::sync::Arc;

use beegfs_volume::utils::setup_logging;
use beegfs_volume::{DriverConfig, Server, VolumeService};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match DriverConfig::load() {
        Ok(config) => config,
        Err(e) => {
            // logging is configured from the config, so report directly
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    setup_logging(config.verbose);

    info!("Launching BeeGFS volume driver...");

    let service = Arc::new(VolumeService::new(config.service_settings()));

    let server = match Server::bind(config, service) {
        Ok(server) => server,
        Err(e) => {
            error!("Driver startup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    server.start().await;
    ExitCode::SUCCESS
}
