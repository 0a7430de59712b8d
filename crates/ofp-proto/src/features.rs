//! `features_request`/`features_reply`: capability and port inventory exchange.

use crate::error::{CodecError, Result};
use crate::port::{PhyPort, PHY_PORT_LEN};

/// `ofp_capabilities` bits.
pub mod capabilities {
    /// Flow statistics.
    pub const FLOW_STATS: u32 = 1 << 0;
    /// Table statistics.
    pub const TABLE_STATS: u32 = 1 << 1;
    /// Port statistics.
    pub const PORT_STATS: u32 = 1 << 2;
    /// 802.1D spanning tree.
    pub const STP: u32 = 1 << 3;
    /// Reserved, must be zero.
    pub const RESERVED: u32 = 1 << 4;
    /// Can reassemble IP fragments.
    pub const IP_REASM: u32 = 1 << 5;
    /// Queue statistics.
    pub const QUEUE_STATS: u32 = 1 << 6;
    /// Match IP addresses in ARP packets.
    pub const ARP_MATCH_IP: u32 = 1 << 7;
}

/// `ofp_action_type` bitmap, as advertised in `features_reply.actions`.
pub mod actions_bitmap {
    /// Bit for [`crate::action::Action::Output`].
    pub const OUTPUT: u32 = 1 << 0;
    /// Bit for [`crate::action::Action::SetVlanVid`].
    pub const SET_VLAN_VID: u32 = 1 << 1;
    /// Bit for [`crate::action::Action::SetVlanPcp`].
    pub const SET_VLAN_PCP: u32 = 1 << 2;
    /// Bit for [`crate::action::Action::StripVlan`].
    pub const STRIP_VLAN: u32 = 1 << 3;
    /// Bit for [`crate::action::Action::SetDlSrc`].
    pub const SET_DL_SRC: u32 = 1 << 4;
    /// Bit for [`crate::action::Action::SetDlDst`].
    pub const SET_DL_DST: u32 = 1 << 5;
    /// Bit for [`crate::action::Action::SetNwSrc`].
    pub const SET_NW_SRC: u32 = 1 << 6;
    /// Bit for [`crate::action::Action::SetNwDst`].
    pub const SET_NW_DST: u32 = 1 << 7;
    /// Bit for [`crate::action::Action::SetNwTos`].
    pub const SET_NW_TOS: u32 = 1 << 8;
    /// Bit for [`crate::action::Action::SetTpSrc`].
    pub const SET_TP_SRC: u32 = 1 << 9;
    /// Bit for [`crate::action::Action::SetTpDst`].
    pub const SET_TP_DST: u32 = 1 << 10;
    /// Bit for [`crate::action::Action::Enqueue`].
    pub const ENQUEUE: u32 = 1 << 11;
    /// Bit for [`crate::action::Action::Vendor`].
    pub const VENDOR: u32 = 1 << 12;
}

/// Switch-to-controller reply completing the handshake: identity, capacity and port inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeaturesReply {
    /// 48-bit datapath id, carried in the upper two octets' implementation-defined space plus a MAC.
    pub datapath_id: u64,
    /// Number of packets that can be buffered awaiting a controller decision.
    pub n_buffers: u32,
    /// Number of flow tables supported.
    pub n_tables: u8,
    /// [`capabilities`] bitmap.
    pub capabilities: u32,
    /// [`actions_bitmap`] bitmap of supported action types.
    pub actions: u32,
    /// Physical ports present on this switch at handshake time.
    pub ports: Vec<PhyPort>,
}

impl FeaturesReply {
    /// Fixed-body length (excluding header and ports): 24 octets.
    pub const FIXED_LEN: usize = 8 + 4 + 1 + 3 + 4 + 4;

    /// Total body length, including the trailing port list.
    pub fn len(&self) -> u16 {
        Self::FIXED_LEN as u16 + (self.ports.len() * PHY_PORT_LEN) as u16
    }

    /// Marshal the message body (excluding the header).
    pub fn marshal(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len() as usize);
        out.extend_from_slice(&self.datapath_id.to_be_bytes());
        out.extend_from_slice(&self.n_buffers.to_be_bytes());
        out.push(self.n_tables);
        out.extend_from_slice(&[0u8; 3]);
        out.extend_from_slice(&self.capabilities.to_be_bytes());
        out.extend_from_slice(&self.actions.to_be_bytes());
        for port in &self.ports {
            out.extend_from_slice(&port.marshal());
        }
        out
    }

    /// Parse the message body. The port count is derived from `body_len`
    /// (`header.length - 8 - FIXED_LEN`); a non-zero remainder is a decode error.
    pub fn unmarshal(data: &[u8], body_len: usize) -> Result<Self> {
        if data.len() < Self::FIXED_LEN || body_len < Self::FIXED_LEN {
            return Err(CodecError::Truncated { what: "features_reply", need: Self::FIXED_LEN, got: data.len() });
        }
        #[allow(clippy::expect_used, reason = "slice width fixed by the FIXED_LEN bounds check above")]
        let datapath_id = u64::from_be_bytes(data[0..8].try_into().expect("length checked"));
        #[allow(clippy::expect_used, reason = "slice width fixed by the FIXED_LEN bounds check above")]
        let n_buffers = u32::from_be_bytes(data[8..12].try_into().expect("length checked"));
        let n_tables = data[12];
        #[allow(clippy::expect_used, reason = "slice width fixed by the FIXED_LEN bounds check above")]
        let capabilities = u32::from_be_bytes(data[16..20].try_into().expect("length checked"));
        #[allow(clippy::expect_used, reason = "slice width fixed by the FIXED_LEN bounds check above")]
        let actions = u32::from_be_bytes(data[20..24].try_into().expect("length checked"));

        let ports_len = body_len - Self::FIXED_LEN;
        if ports_len % PHY_PORT_LEN != 0 {
            return Err(CodecError::PortListMisaligned { body_len: ports_len });
        }
        let ports_data = &data[Self::FIXED_LEN..body_len.min(data.len())];
        let mut ports = Vec::with_capacity(ports_len / PHY_PORT_LEN);
        for chunk in ports_data.chunks_exact(PHY_PORT_LEN) {
            ports.push(PhyPort::unmarshal(chunk)?);
        }

        Ok(Self { datapath_id, n_buffers, n_tables, capabilities, actions, ports })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_2_features_reply_with_zero_ports() {
        let mut data = Vec::new();
        data.extend_from_slice(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]);
        data.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
        data.extend_from_slice(&[0x05, 0x00, 0x00, 0x00]);
        data.extend_from_slice(&[0x00, 0x00, 0x00, 0x8F]);
        data.extend_from_slice(&[0x00, 0x00, 0x0F, 0xFF]);

        let reply = FeaturesReply::unmarshal(&data, FeaturesReply::FIXED_LEN).unwrap();
        assert_eq!(reply.datapath_id, 0x0102_0304_0506_0708);
        assert_eq!(reply.n_tables, 5);
        assert_eq!(reply.capabilities, 0x8F);
        assert_eq!(reply.actions, 0xFFF);
        assert!(reply.ports.is_empty());
    }

    #[test]
    fn misaligned_port_list_is_rejected() {
        let mut data = vec![0u8; FeaturesReply::FIXED_LEN];
        data.extend_from_slice(&[0u8; 10]);
        assert!(FeaturesReply::unmarshal(&data, data.len()).is_err());
    }
}
