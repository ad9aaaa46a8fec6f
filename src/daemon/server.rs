//! Unix socket server that feeds daemon requests to the command loop

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::daemon::ipc::{decode_frame, encode_frame, frame_len, DaemonRequest, DaemonResponse};

/// A request paired with the channel its response goes back on
pub type Command = (DaemonRequest, oneshot::Sender<DaemonResponse>);
pub type CommandSender = mpsc::Sender<Command>;
pub type CommandReceiver = mpsc::Receiver<Command>;

/// Listener bound to the daemon socket. Removes the socket file on drop.
pub struct SocketServer {
    socket_path: PathBuf,
    listener: UnixListener,
}

impl SocketServer {
    /// Bind the socket, replacing a stale socket file
    pub fn bind(socket_path: PathBuf) -> Result<Self> {
        if socket_path.exists() {
            std::fs::remove_file(&socket_path)
                .with_context(|| format!("Failed to remove stale socket {:?}", socket_path))?;
        }

        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let listener = UnixListener::bind(&socket_path)
            .with_context(|| format!("Failed to bind {:?}", socket_path))?;
        info!("IPC server listening on {:?}", socket_path);

        Ok(Self {
            socket_path,
            listener,
        })
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Accept connections forever, one task per connection
    pub async fn run(&self, cmd_tx: CommandSender) {
        loop {
            match self.listener.accept().await {
                Ok((stream, _addr)) => {
                    let tx = cmd_tx.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, tx).await {
                            error!("Connection error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }
    }
}

impl Drop for SocketServer {
    fn drop(&mut self) {
        if self.socket_path.exists() {
            let _ = std::fs::remove_file(&self.socket_path);
        }
    }
}

/// Serve one client: read a frame, forward it, write the reply, repeat
async fn handle_connection(mut stream: UnixStream, cmd_tx: CommandSender) -> Result<()> {
    debug!("New client connection");

    loop {
        let mut header = [0u8; 4];
        match stream.read_exact(&mut header).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                debug!("Client disconnected");
                break;
            }
            Err(e) => return Err(e.into()),
        }

        let len = match frame_len(header) {
            Ok(len) => len,
            Err(e) => {
                warn!("Dropping client: {}", e);
                break;
            }
        };

        let mut body = vec![0u8; len];
        stream.read_exact(&mut body).await?;

        let request: DaemonRequest = match decode_frame(&body) {
            Ok(request) => request,
            Err(e) => {
                let response = DaemonResponse::Error {
                    message: format!("Invalid request: {}", e),
                };
                stream.write_all(&encode_frame(&response)?).await?;
                continue;
            }
        };

        let is_shutdown = matches!(request, DaemonRequest::Shutdown);

        let (resp_tx, resp_rx) = oneshot::channel();
        cmd_tx
            .send((request, resp_tx))
            .await
            .context("Command loop has stopped")?;

        let response = resp_rx.await.unwrap_or(DaemonResponse::Error {
            message: "Handler closed".to_string(),
        });
        stream.write_all(&encode_frame(&response)?).await?;

        if is_shutdown {
            break;
        }
    }

    Ok(())
}
