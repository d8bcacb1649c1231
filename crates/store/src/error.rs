//! Error types for store access.

use redmap_protocol::ProtocolError;
use thiserror::Error;

/// Errors surfaced by a [`Store`](crate::Store) implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Socket-level failure talking to the server.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The server sent bytes that are not valid RESP.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The server answered with an error reply (`-ERR ...`, `-WRONGTYPE ...`).
    #[error("server error: {0}")]
    Server(String),

    /// The reply was valid RESP but not the shape the command returns.
    #[error("unexpected reply to {command}: {reply}")]
    UnexpectedReply {
        /// Command that was sent
        command: &'static str,
        /// Debug rendering of the reply
        reply: String,
    },

    /// The server closed the connection before replying.
    #[error("connection closed by server")]
    ConnectionClosed,

    /// The connection parameters are unusable.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for Result with StoreError.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

impl From<std::str::Utf8Error> for StoreError {
    fn from(err: std::str::Utf8Error) -> Self {
        StoreError::Protocol(ProtocolError::Utf8(err))
    }
}
