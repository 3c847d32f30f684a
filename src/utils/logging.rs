//! Logging utilities
//!
//! Provides logging setup and configuration.

use log::LevelFilter;

/// Setup logging for the driver.
///
/// Verbose mode logs at debug level, otherwise info. `RUST_LOG` still
/// takes precedence when set.
pub fn setup_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}
