//! Volume result types
//!
//! Defines the payloads returned by volume operations.

use std::collections::HashMap;
use std::path::PathBuf;

/// Caller supplied options. Unrecognized keys are ignored.
pub type Options = HashMap<String, String>;

/// Volume descriptor returned by Get and List
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volume {
    pub name: String,
    pub mountpoint: PathBuf,
}
