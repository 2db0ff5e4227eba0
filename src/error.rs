//! Error types for memwire
//!
//! One enum covers the whole memcached failure taxonomy. The protocol's
//! class hierarchy (client error / server error / unknown) is kept through
//! the `is_*` classification methods so callers can branch on failure kind
//! without matching every variant.

use thiserror::Error;

/// Result type alias using MemcacheError
pub type Result<T> = std::result::Result<T, MemcacheError>;

/// Unified error type for memcached operations
#[derive(Debug, Error)]
pub enum MemcacheError {
    // -------------------------------------------------------------------------
    // Client Errors
    // -------------------------------------------------------------------------
    /// `CLIENT_ERROR <msg>`: memcached rejected the request as malformed.
    #[error("client error: {0}")]
    Client(String),

    /// `ERROR`: memcached did not recognize the command.
    #[error("unknown command")]
    UnknownCommand,

    /// Raised before any I/O for keys or values memcached would reject.
    #[error("illegal input: {0}")]
    IllegalInput(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Server Errors
    // -------------------------------------------------------------------------
    /// `SERVER_ERROR <msg>`: memcached failed to process a valid request.
    #[error("server error: {0}")]
    Server(String),

    /// The peer closed the socket in the middle of a frame.
    #[error("connection closed unexpectedly")]
    UnexpectedClose,

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    /// A response line that matches nothing the command can return.
    #[error("unknown response: {0}")]
    Unknown(String),

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MemcacheError {
    /// True for errors caused by the request itself, including ones caught
    /// client-side before anything was sent.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            MemcacheError::Client(_)
                | MemcacheError::UnknownCommand
                | MemcacheError::IllegalInput(_)
                | MemcacheError::Serialization(_)
        )
    }

    /// True for failures on the memcached side of the connection.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            MemcacheError::Server(_) | MemcacheError::UnexpectedClose
        )
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, MemcacheError::Unknown(_))
    }

    /// True for raw transport failures, timeouts included.
    pub fn is_io(&self) -> bool {
        matches!(self, MemcacheError::Io(_))
    }

    /// True for timeouts reported by the socket layer.
    pub fn is_timeout(&self) -> bool {
        match self {
            MemcacheError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            ),
            _ => false,
        }
    }

    /// Builds an unknown-response error from a raw protocol line.
    pub(crate) fn unknown_line(line: &[u8]) -> Self {
        MemcacheError::Unknown(String::from_utf8_lossy(line).into_owned())
    }
}
