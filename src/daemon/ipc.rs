//! IPC protocol definitions for daemon communication
//!
//! Frames are a little-endian `u32` length followed by a JSON body.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::summary::{GuardStatus, SummarizationMode, SummarizationRequest, SummarizationResult};
use crate::BrieflyError;

/// Largest accepted frame body.
pub const MAX_FRAME_LEN: usize = 4 * 1024 * 1024;

/// Request sent from the CLI to the daemon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DaemonRequest {
    /// Summarize text, superseding any request in flight
    Summarize(SummarizationRequest),

    /// Summarize the last input again, optionally in another mode
    Regenerate { mode: Option<SummarizationMode> },

    /// Cancel the request in flight
    Cancel,

    /// Get current status
    GetStatus,

    /// Ping to check if daemon is alive
    Ping,

    /// Shutdown the daemon
    Shutdown,
}

/// Response sent from the daemon to the CLI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DaemonResponse {
    /// Finished summary
    Summary(SummarizationResult),

    /// A newer request replaced this one
    Superseded,

    /// Whether anything was cancelled
    Cancelled { was_in_flight: bool },

    /// Current status
    Status(GuardStatus),

    /// Pong response to ping
    Pong,

    /// Acknowledgment (for shutdown)
    Ok,

    /// Error response
    Error { message: String },
}

/// Encode a message as a length-prefixed frame
pub fn encode_frame<T: Serialize>(message: &T) -> crate::Result<Vec<u8>> {
    let json = serde_json::to_vec(message)
        .map_err(|e| BrieflyError::Ipc(format!("Failed to serialize message: {}", e)))?;
    if json.len() > MAX_FRAME_LEN {
        return Err(BrieflyError::Ipc(format!(
            "Message too large: {} bytes",
            json.len()
        )));
    }

    let mut bytes = (json.len() as u32).to_le_bytes().to_vec();
    bytes.extend(json);
    Ok(bytes)
}

/// Decode a frame body
pub fn decode_frame<T: DeserializeOwned>(body: &[u8]) -> crate::Result<T> {
    serde_json::from_slice(body)
        .map_err(|e| BrieflyError::Ipc(format!("Failed to parse message: {}", e)))
}

/// Validate a frame length header
pub fn frame_len(header: [u8; 4]) -> crate::Result<usize> {
    let len = u32::from_le_bytes(header) as usize;
    if len > MAX_FRAME_LEN {
        return Err(BrieflyError::Ipc(format!("Message too large: {} bytes", len)));
    }
    Ok(len)
}
