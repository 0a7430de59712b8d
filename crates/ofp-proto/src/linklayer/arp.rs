//! Address Resolution Protocol packets.

use crate::error::{CodecError, Result};

/// ARP request.
pub const ARP_REQUEST: u16 = 1;
/// ARP reply.
pub const ARP_REPLY: u16 = 2;

/// A parsed ARP packet (Ethernet/IPv4 flavour).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arp {
    /// Hardware type; `1` for Ethernet.
    pub htype: u16,
    /// Protocol type; `0x0800` for IPv4.
    pub ptype: u16,
    /// Hardware address length; `6` for Ethernet.
    pub hlen: u8,
    /// Protocol address length; `4` for IPv4.
    pub plen: u8,
    /// Operation: [`ARP_REQUEST`] or [`ARP_REPLY`].
    pub oper: u16,
    /// Sender hardware address.
    pub sha: [u8; 6],
    /// Sender protocol (IPv4) address.
    pub spa: [u8; 4],
    /// Target hardware address.
    pub tha: [u8; 6],
    /// Target protocol (IPv4) address.
    pub tpa: [u8; 4],
}

impl Arp {
    /// Wire size for the Ethernet/IPv4 flavour: 28 octets.
    pub const WIRE_LEN: usize = 28;

    /// Marshal to exactly [`Self::WIRE_LEN`] octets.
    pub fn marshal(&self) -> [u8; Self::WIRE_LEN] {
        let mut out = [0u8; Self::WIRE_LEN];
        out[0..2].copy_from_slice(&self.htype.to_be_bytes());
        out[2..4].copy_from_slice(&self.ptype.to_be_bytes());
        out[4] = self.hlen;
        out[5] = self.plen;
        out[6..8].copy_from_slice(&self.oper.to_be_bytes());
        out[8..14].copy_from_slice(&self.sha);
        out[14..18].copy_from_slice(&self.spa);
        out[18..24].copy_from_slice(&self.tha);
        out[24..28].copy_from_slice(&self.tpa);
        out
    }

    /// Parse from the first [`Self::WIRE_LEN`] octets of `data`.
    pub fn unmarshal(data: &[u8]) -> Result<Self> {
        if data.len() < Self::WIRE_LEN {
            return Err(CodecError::Truncated { what: "arp", need: Self::WIRE_LEN, got: data.len() });
        }
        let mut sha = [0u8; 6];
        sha.copy_from_slice(&data[8..14]);
        let mut spa = [0u8; 4];
        spa.copy_from_slice(&data[14..18]);
        let mut tha = [0u8; 6];
        tha.copy_from_slice(&data[18..24]);
        let mut tpa = [0u8; 4];
        tpa.copy_from_slice(&data[24..28]);
        Ok(Self {
            htype: u16::from_be_bytes([data[0], data[1]]),
            ptype: u16::from_be_bytes([data[2], data[3]]),
            hlen: data[4],
            plen: data[5],
            oper: u16::from_be_bytes([data[6], data[7]]),
            sha,
            spa,
            tha,
            tpa,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let arp = Arp {
            htype: 1,
            ptype: 0x0800,
            hlen: 6,
            plen: 4,
            oper: ARP_REQUEST,
            sha: [1; 6],
            spa: [10, 0, 0, 1],
            tha: [0; 6],
            tpa: [10, 0, 0, 2],
        };
        let wire = arp.marshal();
        assert_eq!(Arp::unmarshal(&wire).unwrap(), arp);
    }
}
