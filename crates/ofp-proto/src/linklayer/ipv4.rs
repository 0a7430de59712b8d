//! IPv4, dispatching its payload to ICMP or UDP by protocol number.

use super::icmp::Icmp;
use super::udp::Udp;
use crate::error::{CodecError, Result};

/// ICMP protocol number.
pub const PROTO_ICMP: u8 = 0x01;
/// TCP protocol number.
pub const PROTO_TCP: u8 = 0x06;
/// UDP protocol number.
pub const PROTO_UDP: u8 = 0x11;

/// Payload of an IPv4 packet, dispatched by protocol number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ipv4Payload {
    /// ICMP.
    Icmp(Icmp),
    /// UDP.
    Udp(Udp),
    /// Any other protocol (including TCP), carried opaquely.
    Opaque(Vec<u8>),
}

impl Ipv4Payload {
    fn marshal(&self) -> Vec<u8> {
        match self {
            Self::Icmp(i) => i.marshal(),
            Self::Udp(u) => u.marshal(),
            Self::Opaque(b) => b.clone(),
        }
    }
}

/// A parsed IPv4 header plus protocol-dispatched payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv4 {
    /// IP version; always 4 for a well-formed packet.
    pub version: u8,
    /// Internet header length, in 32-bit words.
    pub ihl: u8,
    /// Differentiated Services Code Point.
    pub dscp: u8,
    /// Explicit Congestion Notification bits.
    pub ecn: u8,
    /// Total length, including header, as carried on the wire.
    pub total_length: u16,
    /// Identification field, used for fragment reassembly.
    pub id: u16,
    /// Fragmentation flags (3 bits).
    pub flags: u16,
    /// Fragment offset (13 bits).
    pub fragment_offset: u16,
    /// Time to live.
    pub ttl: u8,
    /// Protocol number; dispatches `payload`.
    pub protocol: u8,
    /// Header checksum, as carried on the wire (not recomputed).
    pub checksum: u16,
    /// Source address.
    pub src: [u8; 4],
    /// Destination address.
    pub dst: [u8; 4],
    /// IP options, if `ihl` > 5.
    pub options: Vec<u8>,
    /// Protocol-dispatched payload.
    pub payload: Ipv4Payload,
}

impl Ipv4 {
    /// Marshal to octets.
    pub fn marshal(&self) -> Vec<u8> {
        let header_len = usize::from(self.ihl) * 4;
        let mut out = vec![0u8; header_len];
        out[0] = (self.version << 4) | (self.ihl & 0x0F);
        out[1] = (self.dscp << 2) | (self.ecn & 0x03);
        out[2..4].copy_from_slice(&self.total_length.to_be_bytes());
        out[4..6].copy_from_slice(&self.id.to_be_bytes());
        let flags_frag = (self.flags << 13) | (self.fragment_offset & 0x1FFF);
        out[6..8].copy_from_slice(&flags_frag.to_be_bytes());
        out[8] = self.ttl;
        out[9] = self.protocol;
        out[10..12].copy_from_slice(&self.checksum.to_be_bytes());
        out[12..16].copy_from_slice(&self.src);
        out[16..20].copy_from_slice(&self.dst);
        let opt_end = 20 + self.options.len();
        if opt_end <= header_len {
            out[20..opt_end].copy_from_slice(&self.options);
        }
        out.extend_from_slice(&self.payload.marshal());
        out
    }

    /// Parse an IPv4 header and protocol-dispatched payload from `data`.
    pub fn unmarshal(data: &[u8]) -> Result<Self> {
        if data.len() < 20 {
            return Err(CodecError::Truncated { what: "ipv4", need: 20, got: data.len() });
        }
        let version = data[0] >> 4;
        let ihl = data[0] & 0x0F;
        let header_len = usize::from(ihl) * 4;
        if data.len() < header_len {
            return Err(CodecError::Truncated { what: "ipv4", need: header_len, got: data.len() });
        }
        let dscp = data[1] >> 2;
        let ecn = data[1] & 0x03;
        let total_length = u16::from_be_bytes([data[2], data[3]]);
        let id = u16::from_be_bytes([data[4], data[5]]);
        let flags_frag = u16::from_be_bytes([data[6], data[7]]);
        let ttl = data[8];
        let protocol = data[9];
        let checksum = u16::from_be_bytes([data[10], data[11]]);
        let mut src = [0u8; 4];
        src.copy_from_slice(&data[12..16]);
        let mut dst = [0u8; 4];
        dst.copy_from_slice(&data[16..20]);
        let options = data[20..header_len].to_vec();

        let body = &data[header_len..];
        let payload = match protocol {
            PROTO_ICMP => Ipv4Payload::Icmp(Icmp::unmarshal(body)?),
            PROTO_UDP => Ipv4Payload::Udp(Udp::unmarshal(body)?),
            _ => Ipv4Payload::Opaque(body.to_vec()),
        };

        Ok(Self {
            version,
            ihl,
            dscp,
            ecn,
            total_length,
            id,
            flags: flags_frag >> 13,
            fragment_offset: flags_frag & 0x1FFF,
            ttl,
            protocol,
            checksum,
            src,
            dst,
            options,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_udp_payload() {
        let packet = Ipv4 {
            version: 4,
            ihl: 5,
            dscp: 0,
            ecn: 0,
            total_length: 28,
            id: 1,
            flags: 0,
            fragment_offset: 0,
            ttl: 64,
            protocol: PROTO_UDP,
            checksum: 0,
            src: [10, 0, 0, 1],
            dst: [10, 0, 0, 2],
            options: Vec::new(),
            payload: Ipv4Payload::Udp(Udp { src_port: 1, dst_port: 2, length: 8, checksum: 0, data: vec![] }),
        };
        let wire = packet.marshal();
        assert_eq!(Ipv4::unmarshal(&wire).unwrap(), packet);
    }
}
