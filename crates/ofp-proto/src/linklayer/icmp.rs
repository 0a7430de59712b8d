//! ICMP, parsed opaquely beyond its 4-octet common header.

use crate::error::{CodecError, Result};

/// A parsed ICMP message: common header plus an opaque rest-of-packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icmp {
    /// ICMP type.
    pub icmp_type: u8,
    /// ICMP code.
    pub code: u8,
    /// Checksum, as carried on the wire (not recomputed).
    pub checksum: u16,
    /// Remaining bytes (varies by type/code; not further decoded).
    pub data: Vec<u8>,
}

impl Icmp {
    /// Marshal to octets.
    pub fn marshal(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + self.data.len());
        out.push(self.icmp_type);
        out.push(self.code);
        out.extend_from_slice(&self.checksum.to_be_bytes());
        out.extend_from_slice(&self.data);
        out
    }

    /// Parse from `data`.
    pub fn unmarshal(data: &[u8]) -> Result<Self> {
        if data.len() < 4 {
            return Err(CodecError::Truncated { what: "icmp", need: 4, got: data.len() });
        }
        Ok(Self {
            icmp_type: data[0],
            code: data[1],
            checksum: u16::from_be_bytes([data[2], data[3]]),
            data: data[4..].to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_with_trailing_data() {
        let icmp = Icmp { icmp_type: 8, code: 0, checksum: 0x1234, data: vec![0xaa, 0xbb] };
        let wire = icmp.marshal();
        assert_eq!(Icmp::unmarshal(&wire).unwrap(), icmp);
    }
}
