//! Errors surfaced by the message stream and the switch registry.

use thiserror::Error;

/// Failures that tear a connection down.
///
/// Every variant is published at most once per connection, on the stream's
/// error channel, and is followed by shutdown of that connection's tasks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// The socket returned an I/O error, or the peer closed the connection.
    #[error("transport error: {0}")]
    Io(String),

    /// The header's declared length was too short to contain a header, or a
    /// length-prefixed body disagreed with the bytes actually on the wire.
    #[error("framing error: {0}")]
    Framing(String),

    /// The stream was closed locally before the operation completed.
    #[error("stream closed")]
    Closed,
}

/// Convenience alias for message-stream results.
pub type Result<T> = core::result::Result<T, StreamError>;
