//! Protocol responses
//!
//! Response codes and formatting.

use crate::volume::Volume;

pub const OK: u16 = 200;
pub const LIST_REPLY: u16 = 213;
pub const GOODBYE: u16 = 221;
pub const PATH_REPLY: u16 = 250;
pub const VOLUME_REPLY: u16 = 251;
pub const TOO_MANY_CONNECTIONS: u16 = 421;
pub const LOCAL_ERROR: u16 = 451;
pub const UNKNOWN_COMMAND: u16 = 500;
pub const SYNTAX_ERROR: u16 = 501;
pub const WRONG_FILESYSTEM: u16 = 550;
pub const PATH_CONFLICT: u16 = 553;
pub const UNKNOWN_VOLUME: u16 = 554;

/// Format a single response line
pub fn format_response(code: u16, message: &str) -> String {
    if message.is_empty() {
        format!("{}\r\n", code)
    } else {
        format!("{} {}\r\n", code, message)
    }
}

/// One `213-name path` line per volume, closed by `213 <n> volumes`
pub fn format_volume_list(volumes: &[Volume]) -> String {
    let mut reply: String = volumes
        .iter()
        .map(|v| format!("{}-{} {}\r\n", LIST_REPLY, v.name, v.mountpoint.display()))
        .collect();
    reply.push_str(&format_response(
        LIST_REPLY,
        &format!("{} volumes", volumes.len()),
    ));
    reply
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_message_has_no_trailing_space() {
        assert_eq!(format_response(PATH_REPLY, ""), "250\r\n");
        assert_eq!(format_response(OK, "OK"), "200 OK\r\n");
    }

    #[test]
    fn test_volume_list_format() {
        let volumes = vec![
            Volume {
                name: "a".into(),
                mountpoint: "/mnt/beegfs/a".into(),
            },
            Volume {
                name: "b".into(),
                mountpoint: "/mnt/beegfs/b".into(),
            },
        ];

        assert_eq!(
            format_volume_list(&volumes),
            "213-a /mnt/beegfs/a\r\n213-b /mnt/beegfs/b\r\n213 2 volumes\r\n"
        );
        assert_eq!(format_volume_list(&[]), "213 0 volumes\r\n");
    }
}
