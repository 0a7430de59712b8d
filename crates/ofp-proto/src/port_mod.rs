//! `port_mod`: controller-to-switch request to change a port's configuration.

use crate::error::{CodecError, Result};
use crate::port::ETH_ALEN;

/// Controller command changing the administrative state of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortMod {
    /// Port to modify.
    pub port_no: u16,
    /// Hardware address the switch should verify against the port's current address.
    pub hw_addr: [u8; ETH_ALEN],
    /// [`crate::port::config`] bits to set.
    pub config: u32,
    /// Bitmask of which `config` bits this message is allowed to change.
    pub mask: u32,
    /// [`crate::port::features`] bits to advertise.
    pub advertise: u32,
}

impl PortMod {
    /// Wire size: 24 octets.
    pub const WIRE_LEN: usize = 2 + ETH_ALEN + 4 + 4 + 4 + 4;

    /// Marshal the message body.
    pub fn marshal(&self) -> [u8; Self::WIRE_LEN] {
        let mut out = [0u8; Self::WIRE_LEN];
        out[0..2].copy_from_slice(&self.port_no.to_be_bytes());
        out[2..8].copy_from_slice(&self.hw_addr);
        let mut at = 8;
        out[at..at + 4].copy_from_slice(&self.config.to_be_bytes());
        at += 4;
        out[at..at + 4].copy_from_slice(&self.mask.to_be_bytes());
        at += 4;
        out[at..at + 4].copy_from_slice(&self.advertise.to_be_bytes());
        out
    }

    /// Parse the message body from `data`.
    pub fn unmarshal(data: &[u8]) -> Result<Self> {
        if data.len() < Self::WIRE_LEN {
            return Err(CodecError::Truncated { what: "port_mod", need: Self::WIRE_LEN, got: data.len() });
        }
        let mut hw_addr = [0u8; ETH_ALEN];
        hw_addr.copy_from_slice(&data[2..8]);
        #[allow(clippy::expect_used, reason = "slice width fixed by the WIRE_LEN bounds check above")]
        let config = u32::from_be_bytes(data[8..12].try_into().expect("length checked"));
        #[allow(clippy::expect_used, reason = "slice width fixed by the WIRE_LEN bounds check above")]
        let mask = u32::from_be_bytes(data[12..16].try_into().expect("length checked"));
        #[allow(clippy::expect_used, reason = "slice width fixed by the WIRE_LEN bounds check above")]
        let advertise = u32::from_be_bytes(data[16..20].try_into().expect("length checked"));
        Ok(Self { port_no: u16::from_be_bytes([data[0], data[1]]), hw_addr, config, mask, advertise })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let port_mod = PortMod {
            port_no: 3,
            hw_addr: [1, 2, 3, 4, 5, 6],
            config: crate::port::config::PORT_DOWN,
            mask: crate::port::config::PORT_DOWN,
            advertise: 0,
        };
        let wire = port_mod.marshal();
        assert_eq!(PortMod::unmarshal(&wire).unwrap(), port_mod);
    }
}
