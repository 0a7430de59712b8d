//! The subset of link-layer formats needed to parse `packet_in` payloads:
//! Ethernet II, the 802.1Q VLAN tag, ARP, IPv4, UDP and ICMP.

pub mod arp;
pub mod eth;
pub mod icmp;
pub mod ipv4;
pub mod link_disco;
pub mod udp;

pub use arp::Arp;
pub use eth::{Ethernet, Vlan};
pub use icmp::Icmp;
pub use ipv4::{Ipv4, Ipv4Payload};
pub use link_disco::LinkDiscovery;
pub use udp::Udp;

/// Ethertype-dispatched payload of an [`Ethernet`] frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Address Resolution Protocol.
    Arp(Arp),
    /// Internet Protocol version 4.
    Ipv4(Ipv4),
    /// The link-discovery announcement payload.
    LinkDiscovery(LinkDiscovery),
    /// Any other ethertype, carried opaquely.
    Opaque(Vec<u8>),
}

impl Payload {
    /// Marshal back to octets.
    pub fn marshal(&self) -> Vec<u8> {
        match self {
            Self::Arp(a) => a.marshal().to_vec(),
            Self::Ipv4(i) => i.marshal(),
            Self::LinkDiscovery(l) => l.marshal().to_vec(),
            Self::Opaque(b) => b.clone(),
        }
    }
}
