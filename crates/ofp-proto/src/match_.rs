//! The 40-byte flow match predicate, and its wildcard bitmask.

use crate::error::{CodecError, Result};

/// Wire size of a [`Match`], in octets.
pub const MATCH_LEN: usize = 40;

/// `ofp_flow_wildcards` bits: one bit per field that is "don't care".
pub mod wildcards {
    /// Switch input port.
    pub const IN_PORT: u32 = 1 << 0;
    /// VLAN id.
    pub const DL_VLAN: u32 = 1 << 1;
    /// Ethernet source address.
    pub const DL_SRC: u32 = 1 << 2;
    /// Ethernet destination address.
    pub const DL_DST: u32 = 1 << 3;
    /// Ethernet frame type.
    pub const DL_TYPE: u32 = 1 << 4;
    /// IP protocol.
    pub const NW_PROTO: u32 = 1 << 5;
    /// TCP/UDP source port.
    pub const TP_SRC: u32 = 1 << 6;
    /// TCP/UDP destination port.
    pub const TP_DST: u32 = 1 << 7;

    /// Shift for the IP source address prefix-length subfield.
    pub const NW_SRC_SHIFT: u32 = 8;
    /// Bit width of the IP source address prefix-length subfield.
    pub const NW_SRC_BITS: u32 = 6;
    /// Mask covering the IP source address prefix-length subfield.
    pub const NW_SRC_MASK: u32 = 0x3f << NW_SRC_SHIFT;
    /// "Match nothing" value for the source prefix-length subfield (fully wildcarded).
    pub const NW_SRC_ALL: u32 = 32 << NW_SRC_SHIFT;

    /// Shift for the IP destination address prefix-length subfield.
    pub const NW_DST_SHIFT: u32 = 14;
    /// Bit width of the IP destination address prefix-length subfield.
    pub const NW_DST_BITS: u32 = 6;
    /// Mask covering the IP destination address prefix-length subfield.
    pub const NW_DST_MASK: u32 = 0x3f << NW_DST_SHIFT;
    /// "Match nothing" value for the destination prefix-length subfield.
    pub const NW_DST_ALL: u32 = 32 << NW_DST_SHIFT;

    /// VLAN priority.
    pub const DL_VLAN_PCP: u32 = 1 << 20;
    /// IP ToS (DSCP field).
    pub const NW_TOS: u32 = 1 << 21;

    /// Wildcard all fields.
    pub const ALL: u32 = (1 << 22) - 1;
}

/// The 40-byte predicate used by flow-mod and stats messages to select frames.
///
/// On the wire, `wildcards` is authoritative: a clear bit means the
/// corresponding field below is significant; a set bit means "don't care",
/// and the field's on-wire value is ignored by the switch. [`Match::new`]
/// derives `wildcards` from which fields are populated so callers do not
/// have to maintain the bitmask by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    /// Wildcard bitmask; see the [`wildcards`] module. Authoritative on decode.
    pub wildcards: u32,
    /// Ingress port; meaningless if [`wildcards::IN_PORT`] is set.
    pub in_port: u16,
    /// Ethernet source address.
    pub dl_src: [u8; 6],
    /// Ethernet destination address.
    pub dl_dst: [u8; 6],
    /// VLAN id.
    pub dl_vlan: u16,
    /// VLAN priority (3 bits).
    pub dl_vlan_pcp: u8,
    /// Ethernet frame type.
    pub dl_type: u16,
    /// IP ToS (6-bit DSCP, as carried in the 8-bit `nw_tos` wire field).
    pub nw_tos: u8,
    /// IP protocol number.
    pub nw_proto: u8,
    /// IPv4 source address, network byte order.
    pub nw_src: [u8; 4],
    /// IPv4 destination address, network byte order.
    pub nw_dst: [u8; 4],
    /// TCP/UDP source port.
    pub tp_src: u16,
    /// TCP/UDP destination port.
    pub tp_dst: u16,
}

impl Default for Match {
    /// Fully wildcarded match: matches every frame.
    fn default() -> Self {
        Self {
            wildcards: wildcards::ALL,
            in_port: 0,
            dl_src: [0; 6],
            dl_dst: [0; 6],
            dl_vlan: 0,
            dl_vlan_pcp: 0,
            dl_type: 0,
            nw_tos: 0,
            nw_proto: 0,
            nw_src: [0; 4],
            nw_dst: [0; 4],
            tp_src: 0,
            tp_dst: 0,
        }
    }
}

impl Match {
    /// Wire size: always 40 octets.
    pub fn len(&self) -> u16 {
        MATCH_LEN as u16
    }

    /// Marshal to exactly [`MATCH_LEN`] octets.
    pub fn marshal(&self) -> [u8; MATCH_LEN] {
        let mut out = [0u8; MATCH_LEN];
        out[0..4].copy_from_slice(&self.wildcards.to_be_bytes());
        out[4..6].copy_from_slice(&self.in_port.to_be_bytes());
        out[6..12].copy_from_slice(&self.dl_src);
        out[12..18].copy_from_slice(&self.dl_dst);
        out[18..20].copy_from_slice(&self.dl_vlan.to_be_bytes());
        out[20] = self.dl_vlan_pcp;
        // out[21] pad
        out[22..24].copy_from_slice(&self.dl_type.to_be_bytes());
        out[24] = self.nw_tos;
        out[25] = self.nw_proto;
        // out[26..28] pad
        out[28..32].copy_from_slice(&self.nw_src);
        out[32..36].copy_from_slice(&self.nw_dst);
        out[36..38].copy_from_slice(&self.tp_src.to_be_bytes());
        out[38..40].copy_from_slice(&self.tp_dst.to_be_bytes());
        out
    }

    /// Parse a match from the first [`MATCH_LEN`] octets of `data`. The
    /// `wildcards` field is taken as authoritative, per §4.1.
    pub fn unmarshal(data: &[u8]) -> Result<Self> {
        if data.len() < MATCH_LEN {
            return Err(CodecError::Truncated { what: "match", need: MATCH_LEN, got: data.len() });
        }
        let mut dl_src = [0u8; 6];
        dl_src.copy_from_slice(&data[6..12]);
        let mut dl_dst = [0u8; 6];
        dl_dst.copy_from_slice(&data[12..18]);
        let mut nw_src = [0u8; 4];
        nw_src.copy_from_slice(&data[28..32]);
        let mut nw_dst = [0u8; 4];
        nw_dst.copy_from_slice(&data[32..36]);
        #[allow(clippy::expect_used, reason = "slice width fixed by the MATCH_LEN bounds check above")]
        let wildcards = u32::from_be_bytes(data[0..4].try_into().expect("length checked"));
        Ok(Self {
            wildcards,
            in_port: u16::from_be_bytes([data[4], data[5]]),
            dl_src,
            dl_dst,
            dl_vlan: u16::from_be_bytes([data[18], data[19]]),
            dl_vlan_pcp: data[20],
            dl_type: u16::from_be_bytes([data[22], data[23]]),
            nw_tos: data[24],
            nw_proto: data[25],
            nw_src,
            nw_dst,
            tp_src: u16::from_be_bytes([data[36], data[37]]),
            tp_dst: u16::from_be_bytes([data[38], data[39]]),
        })
    }

    /// Clear the wildcard bit for a field that has been explicitly populated.
    ///
    /// Builder-style helper: `Match::default().constrain_dl_src([..]).constrain_dl_dst([..])`
    /// produces a match with exactly those wildcard bits cleared.
    pub fn with_dl_src(mut self, addr: [u8; 6]) -> Self {
        self.dl_src = addr;
        self.wildcards &= !wildcards::DL_SRC;
        self
    }

    /// See [`Match::with_dl_src`].
    pub fn with_dl_dst(mut self, addr: [u8; 6]) -> Self {
        self.dl_dst = addr;
        self.wildcards &= !wildcards::DL_DST;
        self
    }

    /// See [`Match::with_dl_src`].
    pub fn with_in_port(mut self, port: u16) -> Self {
        self.in_port = port;
        self.wildcards &= !wildcards::IN_PORT;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_3_clears_only_dl_src_and_dl_dst_bits() {
        let m = Match::default()
            .with_dl_src([0x0a, 0x00, 0x00, 0x00, 0x00, 0x01])
            .with_dl_dst([0x0a, 0x00, 0x00, 0x00, 0x00, 0x02]);

        assert_eq!(m.wildcards, wildcards::ALL & !wildcards::DL_SRC & !wildcards::DL_DST);
        assert_eq!(m.wildcards & wildcards::DL_SRC, 0);
        assert_eq!(m.wildcards & wildcards::DL_DST, 0);
        assert_ne!(m.wildcards & wildcards::IN_PORT, 0);

        let wire = m.marshal();
        let decoded = Match::unmarshal(&wire).unwrap();
        assert_eq!(decoded, m);
    }

    #[test]
    fn default_is_fully_wildcarded() {
        assert_eq!(Match::default().wildcards, wildcards::ALL);
    }

    #[test]
    fn round_trip_is_exact() {
        let mut m = Match::default();
        m.in_port = 3;
        m.dl_vlan = 10;
        m.nw_src = [10, 0, 0, 1];
        let wire = m.marshal();
        assert_eq!(wire.len(), MATCH_LEN);
        assert_eq!(Match::unmarshal(&wire).unwrap(), m);
    }
}
