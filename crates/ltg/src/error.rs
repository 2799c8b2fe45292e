//! Client-side error types.

use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from talking to the daemon or writing ticket files.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Daemon closed the connection without replying")]
    EmptyReply,

    #[error("Daemon reply was not valid UTF-8")]
    InvalidReply,

    #[error("Failed to save {}: {}", .path.display(), .source)]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Request task failed: {0}")]
    Task(String),
}
