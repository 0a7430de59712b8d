//! UDP, parsed opaquely beyond its 8-octet header.

use crate::error::{CodecError, Result};

/// A parsed UDP datagram: header plus an opaque payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Udp {
    /// Source port.
    pub src_port: u16,
    /// Destination port.
    pub dst_port: u16,
    /// Length of header plus data, per the UDP header.
    pub length: u16,
    /// Checksum, as carried on the wire (not recomputed).
    pub checksum: u16,
    /// Payload octets, not further decoded.
    pub data: Vec<u8>,
}

impl Udp {
    /// Marshal to octets.
    pub fn marshal(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(8 + self.data.len());
        out.extend_from_slice(&self.src_port.to_be_bytes());
        out.extend_from_slice(&self.dst_port.to_be_bytes());
        out.extend_from_slice(&self.length.to_be_bytes());
        out.extend_from_slice(&self.checksum.to_be_bytes());
        out.extend_from_slice(&self.data);
        out
    }

    /// Parse from `data`.
    pub fn unmarshal(data: &[u8]) -> Result<Self> {
        if data.len() < 8 {
            return Err(CodecError::Truncated { what: "udp", need: 8, got: data.len() });
        }
        Ok(Self {
            src_port: u16::from_be_bytes([data[0], data[1]]),
            dst_port: u16::from_be_bytes([data[2], data[3]]),
            length: u16::from_be_bytes([data[4], data[5]]),
            checksum: u16::from_be_bytes([data[6], data[7]]),
            data: data[8..].to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let udp = Udp { src_port: 68, dst_port: 67, length: 12, checksum: 0, data: vec![1, 2, 3, 4] };
        let wire = udp.marshal();
        assert_eq!(Udp::unmarshal(&wire).unwrap(), udp);
    }
}
