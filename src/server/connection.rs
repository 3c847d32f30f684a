use log::{debug, info, warn};
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

use crate::protocol::responses::{UNKNOWN_COMMAND, format_response};
use crate::protocol::{CommandStatus, handle_command, parse_command};
use crate::storage::FilesystemProbe;
use crate::volume::VolumeService;

/// Outcome of reading one request line.
#[derive(Debug, PartialEq)]
enum LineRead {
    Eof,
    Line,
    TooLong,
}

/// Reads one line into `buf`, buffering at most `limit + 1` bytes.
///
/// An oversized line is consumed up to its newline in bounded chunks and
/// reported as `TooLong` with `buf` left empty.
async fn read_request<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    limit: usize,
) -> io::Result<LineRead> {
    let cap = limit as u64 + 1;

    buf.clear();
    if (&mut *reader).take(cap).read_until(b'\n', buf).await? == 0 {
        return Ok(LineRead::Eof);
    }
    if buf.len() <= limit {
        return Ok(LineRead::Line);
    }

    while !buf.ends_with(b"\n") {
        buf.clear();
        if (&mut *reader).take(cap).read_until(b'\n', buf).await? == 0 {
            break;
        }
    }
    buf.clear();
    Ok(LineRead::TooLong)
}

/// Serves one orchestrator connection until it quits or disconnects.
///
/// - Reads one request per line.
/// - Runs each request on the blocking pool: operations make filesystem
///   syscalls and may wait for a concurrent create of the same volume.
pub async fn handle_connection<P: FilesystemProbe + 'static>(
    stream: UnixStream,
    conn_id: u64,
    service: Arc<VolumeService<P>>,
    max_command_length: usize,
) -> io::Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut buf = Vec::new();

    debug!("Connection {} opened", conn_id);

    loop {
        match read_request(&mut reader, &mut buf, max_command_length).await? {
            LineRead::Eof => {
                info!("Connection {} closed by peer", conn_id);
                return Ok(());
            }
            LineRead::TooLong => {
                let reply = format_response(UNKNOWN_COMMAND, "Command too long");
                write_half.write_all(reply.as_bytes()).await?;
                continue;
            }
            LineRead::Line => {}
        }

        let Ok(line) = std::str::from_utf8(&buf) else {
            warn!("Connection {} sent a request that is not UTF-8", conn_id);
            let reply = format_response(UNKNOWN_COMMAND, "Command is not valid UTF-8");
            write_half.write_all(reply.as_bytes()).await?;
            continue;
        };

        let command = parse_command(line);
        debug!("Received from connection {}: {:?}", conn_id, command);

        let service = Arc::clone(&service);
        let result = tokio::task::spawn_blocking(move || handle_command(&service, &command))
            .await
            .map_err(io::Error::other)?;

        if let Some(msg) = result.message {
            write_half.write_all(msg.as_bytes()).await?;
        }

        match result.status {
            CommandStatus::Success => {}
            CommandStatus::Failure(reason) => {
                debug!("Connection {} request failed: {}", conn_id, reason);
            }
            CommandStatus::CloseConnection => {
                info!("Connection {} requested to quit", conn_id);
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_lines_within_limit() {
        let mut input: &[u8] = b"LIST\r\nGET vol1\r\n";
        let mut buf = Vec::new();

        assert_eq!(read_request(&mut input, &mut buf, 16).await.unwrap(), LineRead::Line);
        assert_eq!(buf, b"LIST\r\n");
        assert_eq!(read_request(&mut input, &mut buf, 16).await.unwrap(), LineRead::Line);
        assert_eq!(buf, b"GET vol1\r\n");
        assert_eq!(read_request(&mut input, &mut buf, 16).await.unwrap(), LineRead::Eof);
    }

    #[tokio::test]
    async fn test_oversized_line_is_skipped() {
        let long = format!("CREATE {}\r\nLIST\r\n", "x".repeat(100));
        let mut input: &[u8] = long.as_bytes();
        let mut buf = Vec::new();

        assert_eq!(read_request(&mut input, &mut buf, 16).await.unwrap(), LineRead::TooLong);
        assert!(buf.is_empty());
        assert_eq!(read_request(&mut input, &mut buf, 16).await.unwrap(), LineRead::Line);
        assert_eq!(buf, b"LIST\r\n");
    }

    #[tokio::test]
    async fn test_oversized_line_without_newline_never_exceeds_limit() {
        let endless = vec![b'a'; 10_000];
        let mut input: &[u8] = &endless;
        let mut buf = Vec::new();

        assert_eq!(read_request(&mut input, &mut buf, 16).await.unwrap(), LineRead::TooLong);
        assert!(buf.capacity() < 10_000);
        assert_eq!(read_request(&mut input, &mut buf, 16).await.unwrap(), LineRead::Eof);
    }
}
