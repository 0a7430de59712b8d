//! `get_config_reply`/`set_config`: fragment-handling policy and miss-send length.

use crate::error::{CodecError, Result};

/// `ofp_config_flags` values.
pub mod flags {
    /// No special handling for IP fragments.
    pub const FRAG_NORMAL: u16 = 0;
    /// Drop IP fragments.
    pub const FRAG_DROP: u16 = 1;
    /// Reassemble IP fragments before processing.
    pub const FRAG_REASM: u16 = 2;
    /// Bitmask covering the fragment-handling sub-field.
    pub const FRAG_MASK: u16 = 3;
}

/// Body shared by `get_config_reply` and `set_config`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SwitchConfig {
    /// One of the [`flags`] values.
    pub flags: u16,
    /// Maximum bytes of a packet the switch sends to the controller on a miss.
    pub miss_send_len: u16,
}

impl SwitchConfig {
    /// Wire size: 4 octets.
    pub const WIRE_LEN: usize = 4;

    /// Marshal the message body.
    pub fn marshal(&self) -> [u8; Self::WIRE_LEN] {
        let mut out = [0u8; Self::WIRE_LEN];
        out[0..2].copy_from_slice(&self.flags.to_be_bytes());
        out[2..4].copy_from_slice(&self.miss_send_len.to_be_bytes());
        out
    }

    /// Parse the message body from `data`.
    pub fn unmarshal(data: &[u8]) -> Result<Self> {
        if data.len() < Self::WIRE_LEN {
            return Err(CodecError::Truncated { what: "switch_config", need: Self::WIRE_LEN, got: data.len() });
        }
        Ok(Self {
            flags: u16::from_be_bytes([data[0], data[1]]),
            miss_send_len: u16::from_be_bytes([data[2], data[3]]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let config = SwitchConfig { flags: flags::FRAG_NORMAL, miss_send_len: 128 };
        let wire = config.marshal();
        assert_eq!(SwitchConfig::unmarshal(&wire).unwrap(), config);
    }
}
