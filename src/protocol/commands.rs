//! Module `commands`
//!
//! Parses request lines from the orchestrator into commands and defines the
//! result structure handlers return.
//!
//! A request is one line: a verb, the volume name, then optional
//! `key=value` options, e.g. `CREATE vol1 root=/mnt/beegfs`.

use crate::volume::Options;

/// A request parsed from one protocol line.
///
/// Commands that target a volume carry its name; CREATE and MOUNT also keep
/// the options the caller sent.
#[derive(Debug, PartialEq)]
pub enum Command {
    CREATE(String, Options), // Create and register a volume
    REMOVE(String),          // Forget a volume, keep its data
    PATH(String),            // Registered mount path
    MOUNT(String, Options),  // Validate and return the mount path
    UNMOUNT(String),
    GET(String), // Volume descriptor
    LIST,
    QUIT,
    UNKNOWN, // Unknown verb or missing volume name
}

/// Represents the outcome status of executing a command.
pub enum CommandStatus {
    Success,
    Failure(String),
    CloseConnection,
}

/// Struct encapsulating the full result of a command execution.
pub struct CommandResult {
    pub status: CommandStatus,
    pub message: Option<String>,
}

/// Parses a raw request line into the `Command` enum.
///
/// Returns `UNKNOWN` if the verb is unknown or a volume name is missing.
/// Option tokens without `=` are skipped.
pub fn parse_command(raw: &str) -> Command {
    let mut parts = raw.split_whitespace();
    let cmd = parts.next().unwrap_or("").to_ascii_uppercase();
    let name = parts.next().map(str::to_string);

    match (cmd.as_str(), name) {
        ("CREATE", Some(name)) => Command::CREATE(name, parse_options(parts)),
        ("REMOVE", Some(name)) => Command::REMOVE(name),
        ("PATH", Some(name)) => Command::PATH(name),
        ("MOUNT", Some(name)) => Command::MOUNT(name, parse_options(parts)),
        ("UNMOUNT", Some(name)) => Command::UNMOUNT(name),
        ("GET", Some(name)) => Command::GET(name),
        ("LIST", _) => Command::LIST,
        ("QUIT" | "Q", _) => Command::QUIT,
        _ => Command::UNKNOWN,
    }
}

fn parse_options<'a>(tokens: impl Iterator<Item = &'a str>) -> Options {
    tokens
        .filter_map(|token| token.split_once('='))
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}
