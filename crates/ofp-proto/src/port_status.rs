//! `port_status`: switch-to-controller notification of a port change.

use crate::error::{CodecError, Result};
use crate::port::{PhyPort, PHY_PORT_LEN};

/// `ofp_port_reason` values.
pub mod reason {
    /// Port was added.
    pub const ADD: u8 = 0;
    /// Port was removed.
    pub const DELETE: u8 = 1;
    /// Some attribute of the port changed.
    pub const MODIFY: u8 = 2;
}

/// Notification that a port was added, removed, or changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortStatus {
    /// One of the [`reason`] constants.
    pub reason: u8,
    /// Current description of the affected port.
    pub desc: PhyPort,
}

impl PortStatus {
    /// Wire size: 56 octets (1 reason + 7 pad + 48-octet port descriptor).
    pub const WIRE_LEN: usize = 1 + 7 + PHY_PORT_LEN;

    /// Marshal the message body.
    pub fn marshal(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::WIRE_LEN);
        out.push(self.reason);
        out.extend_from_slice(&[0u8; 7]);
        out.extend_from_slice(&self.desc.marshal());
        out
    }

    /// Parse the message body from `data`.
    pub fn unmarshal(data: &[u8]) -> Result<Self> {
        if data.len() < Self::WIRE_LEN {
            return Err(CodecError::Truncated { what: "port_status", need: Self::WIRE_LEN, got: data.len() });
        }
        Ok(Self { reason: data[0], desc: PhyPort::unmarshal(&data[8..Self::WIRE_LEN])? })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let status = PortStatus {
            reason: reason::MODIFY,
            desc: PhyPort {
                port_no: 1,
                hw_addr: [1, 2, 3, 4, 5, 6],
                name: [0u8; 16],
                config: 0,
                state: crate::port::state::LINK_DOWN,
                curr: 0,
                advertised: 0,
                supported: 0,
                peer: 0,
            },
        };
        let wire = status.marshal();
        assert_eq!(wire.len(), PortStatus::WIRE_LEN);
        assert_eq!(PortStatus::unmarshal(&wire).unwrap(), status);
    }
}
