//! The `OFPT_ERROR` message body and its nested error-type/code taxonomy.

use crate::error::{CodecError, Result};

/// `ofp_error_type` wire tags.
pub mod error_type {
    /// Hello protocol failed.
    pub const HELLO_FAILED: u16 = 0;
    /// Request was not understood.
    pub const BAD_REQUEST: u16 = 1;
    /// Error in an action description.
    pub const BAD_ACTION: u16 = 2;
    /// Problem modifying a flow entry.
    pub const FLOW_MOD_FAILED: u16 = 3;
    /// Problem modifying a port entry.
    pub const PORT_MOD_FAILED: u16 = 4;
    /// Queue operation failed.
    pub const QUEUE_OP_FAILED: u16 = 5;
}

/// Codes nested under [`error_type::HELLO_FAILED`].
pub mod hello_failed_code {
    /// No compatible version.
    pub const INCOMPATIBLE: u16 = 0;
    /// Permissions error.
    pub const EPERM: u16 = 1;
}

/// Codes nested under [`error_type::BAD_REQUEST`].
pub mod bad_request_code {
    /// `ofp_header.version` not supported.
    pub const BAD_VERSION: u16 = 0;
    /// `ofp_header.type` not supported.
    pub const BAD_TYPE: u16 = 1;
    /// `ofp_stats_request.type` not supported.
    pub const BAD_STAT: u16 = 2;
    /// Vendor not supported.
    pub const BAD_VENDOR: u16 = 3;
    /// Vendor subtype not supported.
    pub const BAD_SUBTYPE: u16 = 4;
    /// Permissions error.
    pub const EPERM: u16 = 5;
    /// Wrong request length for type.
    pub const BAD_LEN: u16 = 6;
    /// Specified buffer has already been used.
    pub const BUFFER_EMPTY: u16 = 7;
    /// Specified buffer does not exist.
    pub const BUFFER_UNKNOWN: u16 = 8;
}

/// Codes nested under [`error_type::BAD_ACTION`].
pub mod bad_action_code {
    /// Unknown action type.
    pub const BAD_TYPE: u16 = 0;
    /// Length problem in actions.
    pub const BAD_LEN: u16 = 1;
    /// Unknown vendor id specified.
    pub const BAD_VENDOR: u16 = 2;
    /// Unknown action type for vendor id.
    pub const BAD_VENDOR_TYPE: u16 = 3;
    /// Problem validating output port.
    pub const BAD_OUT_PORT: u16 = 4;
    /// Bad action argument.
    pub const BAD_ARGUMENT: u16 = 5;
    /// Permissions error.
    pub const EPERM: u16 = 6;
    /// Can't handle this many actions.
    pub const TOO_MANY: u16 = 7;
    /// Problem validating output queue.
    pub const BAD_QUEUE: u16 = 8;
}

/// Codes nested under [`error_type::FLOW_MOD_FAILED`].
pub mod flow_mod_failed_code {
    /// Flow not added because of full tables.
    pub const ALL_TABLES_FULL: u16 = 0;
    /// Attempted to add overlapping flow with `CHECK_OVERLAP` set.
    pub const OVERLAP: u16 = 1;
    /// Permissions error.
    pub const EPERM: u16 = 2;
    /// Flow not added because of non-zero idle/hard timeout.
    pub const BAD_EMERG_TIMEOUT: u16 = 3;
    /// Unknown command.
    pub const BAD_COMMAND: u16 = 4;
    /// Unsupported action list.
    pub const UNSUPPORTED: u16 = 5;
}

/// Codes nested under [`error_type::PORT_MOD_FAILED`].
pub mod port_mod_failed_code {
    /// Specified port does not exist.
    pub const BAD_PORT: u16 = 0;
    /// Specified hardware address does not match the port.
    pub const BAD_HW_ADDR: u16 = 1;
}

/// Codes nested under [`error_type::QUEUE_OP_FAILED`].
pub mod queue_op_failed_code {
    /// Invalid port or queue.
    pub const BAD_PORT: u16 = 0;
    /// Queue does not exist.
    pub const BAD_QUEUE: u16 = 1;
    /// Permissions error.
    pub const EPERM: u16 = 2;
}

/// The body of an `OFPT_ERROR` message: a nested type/code pair plus a
/// variable-length payload (typically the offending request, truncated).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMsg {
    /// One of the [`error_type`] constants.
    pub error_type: u16,
    /// Meaning depends on `error_type`; see the `*_code` modules.
    pub code: u16,
    /// Variable-length payload, usually up to 64 bytes of the triggering request.
    pub data: Vec<u8>,
}

impl ErrorMsg {
    /// Total wire length: 4-octet fixed part plus the payload.
    pub fn len(&self) -> u16 {
        4 + self.data.len() as u16
    }

    /// Marshal the error body (excluding the outer OpenFlow header).
    pub fn marshal(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len() as usize);
        out.extend_from_slice(&self.error_type.to_be_bytes());
        out.extend_from_slice(&self.code.to_be_bytes());
        out.extend_from_slice(&self.data);
        out
    }

    /// Parse the error body from `data` (the message body after the header).
    pub fn unmarshal(data: &[u8]) -> Result<Self> {
        if data.len() < 4 {
            return Err(CodecError::Truncated { what: "error_msg", need: 4, got: data.len() });
        }
        Ok(Self {
            error_type: u16::from_be_bytes([data[0], data[1]]),
            code: u16::from_be_bytes([data[2], data[3]]),
            data: data[4..].to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_with_payload() {
        let msg = ErrorMsg {
            error_type: error_type::HELLO_FAILED,
            code: hello_failed_code::INCOMPATIBLE,
            data: b"unsupported version".to_vec(),
        };
        let wire = msg.marshal();
        assert_eq!(wire.len(), msg.len() as usize);
        assert_eq!(ErrorMsg::unmarshal(&wire).unwrap(), msg);
    }
}
