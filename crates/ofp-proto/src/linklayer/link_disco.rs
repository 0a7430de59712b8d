//! The custom link-discovery payload carried over the reserved ethertype.
//!
//! The controller core does not interpret this payload; it exists so the
//! link-discovery application (see `ofp-app`) can announce itself to
//! neighbouring switches and recognise the announcement when it arrives back
//! in a `packet_in`.

use crate::error::{CodecError, Result};

/// Wire size: 16 octets.
pub const WIRE_LEN: usize = 16;

/// 8 octets of source datapath id followed by an 8-octet timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkDiscovery {
    /// Datapath id of the switch that emitted this announcement.
    pub src_dpid: [u8; 8],
    /// Wall-clock nanosecond timestamp at the moment of emission.
    pub timestamp_ns: u64,
}

impl LinkDiscovery {
    /// Marshal to exactly [`WIRE_LEN`] octets.
    pub fn marshal(&self) -> [u8; WIRE_LEN] {
        let mut out = [0u8; WIRE_LEN];
        out[0..8].copy_from_slice(&self.src_dpid);
        out[8..16].copy_from_slice(&self.timestamp_ns.to_be_bytes());
        out
    }

    /// Parse from the first [`WIRE_LEN`] octets of `data`; the payload is
    /// carried verbatim, so trailing octets (if any) are ignored rather than
    /// rejected.
    pub fn unmarshal(data: &[u8]) -> Result<Self> {
        if data.len() < WIRE_LEN {
            return Err(CodecError::Truncated { what: "link_discovery", need: WIRE_LEN, got: data.len() });
        }
        let mut src_dpid = [0u8; 8];
        src_dpid.copy_from_slice(&data[0..8]);
        #[allow(clippy::expect_used, reason = "slice width fixed by the WIRE_LEN bounds check above")]
        let timestamp_ns = u64::from_be_bytes(data[8..16].try_into().expect("length checked"));
        Ok(Self { src_dpid, timestamp_ns })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let payload = LinkDiscovery { src_dpid: [1, 2, 3, 4, 5, 6, 7, 8], timestamp_ns: 1_700_000_000_000_000_000 };
        let wire = payload.marshal();
        assert_eq!(LinkDiscovery::unmarshal(&wire).unwrap(), payload);
    }
}
