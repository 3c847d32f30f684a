use log::{error, info, warn};
use std::fs::{self, Permissions};
use std::io;
use std::os::unix::fs::{FileTypeExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Semaphore;

use crate::config::DriverConfig;
use crate::protocol::responses::{TOO_MANY_CONNECTIONS, format_response};
use crate::server::connection::handle_connection;
use crate::storage::{FilesystemProbe, StatfsProbe};
use crate::volume::VolumeService;

/// Socket is readable and writable by owner and group only.
const SOCKET_MODE: u32 = 0o660;

pub struct Server<P = StatfsProbe> {
    listener: UnixListener,
    socket_path: PathBuf,
    service: Arc<VolumeService<P>>,
    config: Arc<DriverConfig>,
    connections: Arc<Semaphore>,
}

impl<P: FilesystemProbe + 'static> Server<P> {
    /// Binds the plugin socket. Must be called from within a Tokio runtime.
    pub fn bind(config: DriverConfig, service: Arc<VolumeService<P>>) -> io::Result<Self> {
        let socket_path = config.socket_path();
        prepare_socket_path(&socket_path)?;

        let listener = UnixListener::bind(&socket_path)?;
        fs::set_permissions(&socket_path, Permissions::from_mode(SOCKET_MODE))?;
        info!("Driver listening on {}", socket_path.display());

        Ok(Self {
            listener,
            socket_path,
            connections: Arc::new(Semaphore::new(config.max_connections)),
            config: Arc::new(config),
            service,
        })
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    pub async fn start(&self) {
        info!(
            "Serving volumes under {} (max {} connections)",
            self.config.root, self.config.max_connections
        );

        let mut next_id: u64 = 0;
        loop {
            match self.listener.accept().await {
                Ok((stream, _)) => {
                    next_id += 1;
                    let conn_id = next_id;

                    let Ok(permit) = Arc::clone(&self.connections).try_acquire_owned() else {
                        warn!("Rejecting connection {}: too many connections", conn_id);
                        tokio::spawn(reject_connection(stream));
                        continue;
                    };

                    let service = Arc::clone(&self.service);
                    let max_command_length = self.config.max_command_length;

                    // Spawn a task per connection so the accept loop doesn't block
                    tokio::spawn(async move {
                        let _permit = permit;
                        if let Err(e) =
                            handle_connection(stream, conn_id, service, max_command_length).await
                        {
                            warn!("Connection {} failed: {}", conn_id, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }
}

async fn reject_connection(mut stream: UnixStream) {
    let reply = format_response(TOO_MANY_CONNECTIONS, "Too many connections. Try again later.");
    let _ = stream.write_all(reply.as_bytes()).await;
    let _ = stream.shutdown().await;
}

/// Creates the socket directory and clears a socket left by a previous run.
fn prepare_socket_path(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_socket() => {
            warn!("Removing stale socket {}", path.display());
            fs::remove_file(path)
        }
        Ok(_) => Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} exists and is not a socket", path.display()),
        )),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
