//! IPC client for communicating with the daemon

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;

use crate::config::Settings;
use crate::daemon::ipc::{decode_frame, encode_frame, frame_len, DaemonRequest, DaemonResponse};

/// Client for communicating with the daemon
pub struct DaemonClient {
    stream: UnixStream,
}

impl DaemonClient {
    /// Connect to the daemon
    pub async fn connect(settings: &Settings) -> Result<Self> {
        let socket_path = settings.socket_path();

        let stream = UnixStream::connect(&socket_path)
            .await
            .with_context(|| {
                format!(
                    "Failed to connect to daemon at {:?}. Is the daemon running? Try: briefly daemon start",
                    socket_path
                )
            })?;

        Ok(Self { stream })
    }

    /// Send a request and wait for the response
    pub async fn send(&mut self, request: DaemonRequest) -> Result<DaemonResponse> {
        let frame = encode_frame(&request)?;
        self.stream.write_all(&frame).await?;

        let mut header = [0u8; 4];
        self.stream
            .read_exact(&mut header)
            .await
            .context("Daemon closed the connection")?;
        let len = frame_len(header)?;

        let mut body = vec![0u8; len];
        self.stream.read_exact(&mut body).await?;

        Ok(decode_frame(&body)?)
    }
}
