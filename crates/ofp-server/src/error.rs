//! Controller-layer error taxonomy (§7): listener failure and handshake failure.
//! Per-message and per-connection stream errors are handled inline by the
//! controller and never propagate past the connection they belong to.

use thiserror::Error;

/// Failures the controller surfaces to its caller.
#[derive(Error, Debug)]
pub enum ServerError {
    /// The listening socket itself failed to bind or accept.
    #[error("listener error: {0}")]
    Listen(String),

    /// The handshake did not complete: wrong version, a peer error, or silence past the deadline.
    #[error("handshake failed: {0}")]
    Handshake(String),

    /// No inbound progress for 3 seconds during the handshake.
    #[error("handshake timed out")]
    HandshakeTimeout,

    /// The stream layer reported a transport or framing error before registration completed.
    #[error(transparent)]
    Stream(#[from] ofp_core::StreamError),
}
