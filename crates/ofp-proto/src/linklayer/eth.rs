//! Ethernet II framing and the optional 802.1Q VLAN tag.

use super::{arp::Arp, ipv4::Ipv4, link_disco::LinkDiscovery, Payload};
use crate::error::{CodecError, Result};

/// IPv4.
pub const ETHERTYPE_IPV4: u16 = 0x0800;
/// ARP.
pub const ETHERTYPE_ARP: u16 = 0x0806;
/// 802.1Q VLAN-tagged frame.
pub const ETHERTYPE_VLAN: u16 = 0x8100;
/// Custom link-discovery payload ethertype, per the link-discovery payload data model.
pub const ETHERTYPE_LINK_DISCOVERY: u16 = 0xA0F1;

/// An 802.1Q tag carried between the addresses and the ethertype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vlan {
    /// Priority code point (3 bits).
    pub pcp: u8,
    /// Drop-eligible indicator.
    pub dei: bool,
    /// VLAN identifier (12 bits).
    pub vid: u16,
}

impl Vlan {
    fn from_tci(tci: u16) -> Self {
        Self { pcp: (tci >> 13) as u8, dei: (tci >> 12) & 1 != 0, vid: tci & 0x0FFF }
    }

    fn to_tci(self) -> u16 {
        ((self.pcp as u16) << 13) | (u16::from(self.dei) << 12) | (self.vid & 0x0FFF)
    }
}

/// A parsed Ethernet II frame, the root of the `packet_in` link-layer walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ethernet {
    /// Destination MAC address.
    pub dst: [u8; 6],
    /// Source MAC address.
    pub src: [u8; 6],
    /// Optional 802.1Q tag.
    pub vlan: Option<Vlan>,
    /// Ethertype of the (post-VLAN) payload.
    pub ethertype: u16,
    /// Ethertype-dispatched payload.
    pub payload: Payload,
}

impl Ethernet {
    /// Parse an Ethernet II frame, walking into ethertype-dispatched payloads
    /// until the type is unrecognised or the input is exhausted.
    pub fn unmarshal(data: &[u8]) -> Result<Self> {
        if data.len() < 14 {
            return Err(CodecError::Truncated { what: "ethernet", need: 14, got: data.len() });
        }
        let mut dst = [0u8; 6];
        dst.copy_from_slice(&data[0..6]);
        let mut src = [0u8; 6];
        src.copy_from_slice(&data[6..12]);

        let mut at = 12;
        let mut ethertype = u16::from_be_bytes([data[at], data[at + 1]]);
        at += 2;
        let mut vlan = None;
        if ethertype == ETHERTYPE_VLAN {
            if data.len() < at + 4 {
                return Err(CodecError::Truncated { what: "vlan_tag", need: at + 4, got: data.len() });
            }
            let tci = u16::from_be_bytes([data[at], data[at + 1]]);
            vlan = Some(Vlan::from_tci(tci));
            at += 2;
            ethertype = u16::from_be_bytes([data[at], data[at + 1]]);
            at += 2;
        }

        let body = &data[at..];
        let payload = match ethertype {
            ETHERTYPE_ARP => Payload::Arp(Arp::unmarshal(body)?),
            ETHERTYPE_IPV4 => Payload::Ipv4(Ipv4::unmarshal(body)?),
            ETHERTYPE_LINK_DISCOVERY => Payload::LinkDiscovery(LinkDiscovery::unmarshal(body)?),
            _ => Payload::Opaque(body.to_vec()),
        };

        Ok(Self { dst, src, vlan, ethertype, payload })
    }

    /// Marshal back to octets.
    pub fn marshal(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&self.dst);
        out.extend_from_slice(&self.src);
        if let Some(vlan) = self.vlan {
            out.extend_from_slice(&ETHERTYPE_VLAN.to_be_bytes());
            out.extend_from_slice(&vlan.to_tci().to_be_bytes());
        }
        out.extend_from_slice(&self.ethertype.to_be_bytes());
        out.extend_from_slice(&self.payload.marshal());
        out
    }

    /// Build a broadcast frame (all-ones destination) carrying the given payload.
    pub fn broadcast(src: [u8; 6], ethertype: u16, payload: Payload) -> Self {
        Self { dst: [0xff; 6], src, vlan: None, ethertype, payload }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_6_arp_packet_in_payload() {
        let arp = Arp {
            htype: 1,
            ptype: ETHERTYPE_IPV4,
            hlen: 6,
            plen: 4,
            oper: 1,
            sha: [0x00, 0x11, 0x22, 0x33, 0x44, 0x55],
            spa: [10, 0, 0, 1],
            tha: [0; 6],
            tpa: [10, 0, 0, 2],
        };
        let frame = Ethernet::broadcast([0x00, 0x11, 0x22, 0x33, 0x44, 0x55], ETHERTYPE_ARP, Payload::Arp(arp.clone()));
        let wire = frame.marshal();
        let decoded = Ethernet::unmarshal(&wire).unwrap();
        match decoded.payload {
            Payload::Arp(got) => {
                assert_eq!(got.oper, 1);
                assert_eq!(got.sha, arp.sha);
                assert_eq!(got.spa, arp.spa);
            },
            other => panic!("expected ARP payload, got {other:?}"),
        }
    }

    #[test]
    fn vlan_tag_round_trips() {
        let frame = Ethernet {
            dst: [1; 6],
            src: [2; 6],
            vlan: Some(Vlan { pcp: 3, dei: false, vid: 42 }),
            ethertype: ETHERTYPE_IPV4,
            payload: Payload::Opaque(vec![1, 2, 3]),
        };
        let wire = frame.marshal();
        let decoded = Ethernet::unmarshal(&wire).unwrap();
        assert_eq!(decoded, frame);
    }
}
