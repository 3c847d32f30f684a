//! Command handlers for the volume driver protocol.
//!
//! Each handler calls one volume operation and turns its outcome into a
//! response line. Failures are logged here and reported to the caller; no
//! request can take the driver down.

use crate::error::VolumeError;
use crate::error::handlers::{error_to_status_code, handle_error};
use crate::protocol::responses::{
    GOODBYE, OK, PATH_REPLY, UNKNOWN_COMMAND, VOLUME_REPLY, format_response, format_volume_list,
};
use crate::protocol::{Command, CommandResult, CommandStatus};
use crate::storage::FilesystemProbe;
use crate::volume::{Options, VolumeService};

/// Dispatches a parsed command to its handler.
///
/// # Arguments
///
/// * `service` - The volume service shared by all connections.
/// * `command` - Reference to the parsed command.
///
/// # Returns
///
/// * `CommandResult` - Status and the response to send back.
pub fn handle_command<P: FilesystemProbe>(
    service: &VolumeService<P>,
    command: &Command,
) -> CommandResult {
    match command {
        Command::CREATE(name, options) => handle_cmd_create(service, name, options),
        Command::REMOVE(name) => handle_cmd_remove(service, name),
        Command::PATH(name) => handle_cmd_path(service, name),
        Command::MOUNT(name, options) => handle_cmd_mount(service, name, options),
        Command::UNMOUNT(name) => handle_cmd_unmount(service, name),
        Command::GET(name) => handle_cmd_get(service, name),
        Command::LIST => handle_cmd_list(service),
        Command::QUIT => CommandResult {
            status: CommandStatus::CloseConnection,
            message: Some(format_response(GOODBYE, "Goodbye")),
        },
        Command::UNKNOWN => CommandResult {
            status: CommandStatus::Failure("Unknown command".into()),
            message: Some(format_response(UNKNOWN_COMMAND, "Unknown command")),
        },
    }
}

fn success(code: u16, message: &str) -> CommandResult {
    CommandResult {
        status: CommandStatus::Success,
        message: Some(format_response(code, message)),
    }
}

fn failure(operation: &str, name: &str, err: VolumeError) -> CommandResult {
    handle_error(operation, name, &err);
    let text = err.to_string();
    CommandResult {
        message: Some(format_response(error_to_status_code(&err), &text)),
        status: CommandStatus::Failure(text),
    }
}

fn handle_cmd_create<P: FilesystemProbe>(
    service: &VolumeService<P>,
    name: &str,
    options: &Options,
) -> CommandResult {
    match service.create(name, options) {
        Ok(()) => success(OK, "OK"),
        Err(e) => failure("Create", name, e),
    }
}

fn handle_cmd_remove<P: FilesystemProbe>(service: &VolumeService<P>, name: &str) -> CommandResult {
    service.remove(name);
    success(OK, "OK")
}

/// Unknown volumes get an empty path, not an error.
fn handle_cmd_path<P: FilesystemProbe>(service: &VolumeService<P>, name: &str) -> CommandResult {
    match service.path(name) {
        Some(path) => success(PATH_REPLY, &path.to_string_lossy()),
        None => success(PATH_REPLY, ""),
    }
}

fn handle_cmd_mount<P: FilesystemProbe>(
    service: &VolumeService<P>,
    name: &str,
    options: &Options,
) -> CommandResult {
    match service.mount(name, options) {
        Ok(path) => success(PATH_REPLY, &path.to_string_lossy()),
        Err(e) => failure("Mount", name, e),
    }
}

fn handle_cmd_unmount<P: FilesystemProbe>(
    service: &VolumeService<P>,
    name: &str,
) -> CommandResult {
    service.unmount(name);
    success(OK, "OK")
}

fn handle_cmd_get<P: FilesystemProbe>(service: &VolumeService<P>, name: &str) -> CommandResult {
    match service.get(name) {
        Ok(volume) => success(
            VOLUME_REPLY,
            &format!("{} {}", volume.name, volume.mountpoint.display()),
        ),
        Err(e) => failure("Get", name, e),
    }
}

fn handle_cmd_list<P: FilesystemProbe>(service: &VolumeService<P>) -> CommandResult {
    CommandResult {
        status: CommandStatus::Success,
        message: Some(format_volume_list(&service.list())),
    }
}
