//! Decode-time errors for the wire codec.

use thiserror::Error;

/// Failures that can occur while turning wire octets into typed messages.
///
/// Every variant here corresponds to a concrete failure mode a peer can
/// trigger; none of them should ever panic the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Fewer octets were supplied than the type's minimum wire size.
    #[error("truncated {what}: need at least {need} bytes, got {got}")]
    Truncated {
        /// Name of the type being decoded, for diagnostics.
        what: &'static str,
        /// Minimum number of bytes required.
        need: usize,
        /// Number of bytes actually available.
        got: usize,
    },

    /// The header's `type` octet did not match any known message type.
    #[error("unknown message type {0:#04x}")]
    UnknownMessageType(u8),

    /// The header's `length` field was smaller than the header itself.
    #[error("declared length {0} is shorter than the header")]
    LengthTooShort(u16),

    /// `features_reply`'s port list length did not divide evenly by the port size.
    #[error("features_reply port list has non-zero remainder: body {body_len} bytes")]
    PortListMisaligned {
        /// Length of the port-list body in bytes.
        body_len: usize,
    },

    /// A `stats_reply`/`stats_request` carried an unrecognised stats type discriminator.
    #[error("unknown stats type {0:#06x}")]
    UnknownStatsType(u16),

    /// An action's declared length was not a multiple of 8, or shorter than its header.
    #[error("malformed action: declared length {0} invalid")]
    MalformedAction(u16),
}

/// Convenience alias for codec results.
pub type Result<T> = core::result::Result<T, CodecError>;
