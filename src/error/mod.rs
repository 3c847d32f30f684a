//! Error handling
//!
//! Defines error types and handling for the volume driver.

pub mod handlers;
pub mod types;

pub use types::*;
