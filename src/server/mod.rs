//! Server core functionality
//!
//! The Unix socket listener and the per-connection request loop.

pub mod connection;
pub mod core;

pub use core::Server;
