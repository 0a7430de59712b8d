//! Physical port descriptor and the special reserved port numbers.

use crate::error::{CodecError, Result};

/// Wire size of a [`PhyPort`], in octets.
pub const PHY_PORT_LEN: usize = 48;

/// Maximum length of a port's name field, including the NUL terminator.
pub const MAX_PORT_NAME_LEN: usize = 16;

/// Length of an Ethernet hardware address, in octets.
pub const ETH_ALEN: usize = 6;

/// Reserved port numbers with implementation-defined meaning rather than a real interface.
pub mod special {
    /// Maximum number of a physical, non-reserved port.
    pub const MAX: u16 = 0xFF00;
    /// Send the packet out the input port.
    pub const IN_PORT: u16 = 0xFFF8;
    /// Perform actions in flow table, usually used only in PacketOut messages.
    pub const TABLE: u16 = 0xFFF9;
    /// Process with normal L2/L3 switching.
    pub const NORMAL: u16 = 0xFFFA;
    /// Flood using the spanning tree.
    pub const FLOOD: u16 = 0xFFFB;
    /// All physical ports except the input port.
    pub const ALL: u16 = 0xFFFC;
    /// Send to the controller.
    pub const CONTROLLER: u16 = 0xFFFD;
    /// Local openflow "port".
    pub const LOCAL: u16 = 0xFFFE;
    /// Wildcard port used only for flow-mod (delete) and flow-stats requests.
    pub const NONE: u16 = 0xFFFF;
}

/// `ofp_port_config` bits.
pub mod config {
    /// Port is administratively down.
    pub const PORT_DOWN: u32 = 1 << 0;
    /// Disable 802.1D spanning tree on this port.
    pub const NO_STP: u32 = 1 << 1;
    /// Drop all packets except 802.1D spanning tree packets.
    pub const NO_RECV: u32 = 1 << 2;
    /// Drop received 802.1D STP packets.
    pub const NO_RECV_STP: u32 = 1 << 3;
    /// Do not include this port when flooding.
    pub const NO_FLOOD: u32 = 1 << 4;
    /// Drop packets forwarded to this port.
    pub const NO_FWD: u32 = 1 << 5;
    /// Do not send packet-in messages for this port.
    pub const NO_PACKET_IN: u32 = 1 << 6;
}

/// `ofp_port_state` bits.
pub mod state {
    /// No spanning tree state, full forwarding.
    pub const STP_LISTEN: u32 = 0 << 8;
    /// Not learning or forwarding.
    pub const STP_LEARN: u32 = 1 << 8;
    /// Learning but not forwarding.
    pub const STP_FORWARD: u32 = 2 << 8;
    /// Not part of spanning tree.
    pub const STP_BLOCK: u32 = 3 << 8;
    /// Bitmask covering all STP sub-states.
    pub const STP_MASK: u32 = 3 << 8;
    /// No physical link present.
    pub const LINK_DOWN: u32 = 1 << 0;
}

/// `ofp_port_features` bits, shared by `curr`/`advertised`/`supported`/`peer`.
pub mod features {
    /// 10 Mb half-duplex rate support.
    pub const TEN_MB_HD: u32 = 1 << 0;
    /// 10 Mb full-duplex rate support.
    pub const TEN_MB_FD: u32 = 1 << 1;
    /// 100 Mb half-duplex rate support.
    pub const HUNDRED_MB_HD: u32 = 1 << 2;
    /// 100 Mb full-duplex rate support.
    pub const HUNDRED_MB_FD: u32 = 1 << 3;
    /// 1 Gb half-duplex rate support.
    pub const ONE_GB_HD: u32 = 1 << 4;
    /// 1 Gb full-duplex rate support.
    pub const ONE_GB_FD: u32 = 1 << 5;
    /// 10 Gb full-duplex rate support.
    pub const TEN_GB_FD: u32 = 1 << 6;
    /// Copper medium.
    pub const COPPER: u32 = 1 << 7;
    /// Fiber medium.
    pub const FIBER: u32 = 1 << 8;
    /// Auto-negotiation.
    pub const AUTONEG: u32 = 1 << 9;
    /// Pause.
    pub const PAUSE: u32 = 1 << 10;
    /// Asymmetric pause.
    pub const PAUSE_ASYM: u32 = 1 << 11;
}

/// Switch-side descriptor of a single data-plane interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhyPort {
    /// Port number, unique per switch.
    pub port_no: u16,
    /// Hardware (MAC) address of the port.
    pub hw_addr: [u8; ETH_ALEN],
    /// Null-padded human-readable name.
    pub name: [u8; MAX_PORT_NAME_LEN],
    /// `ofp_port_config` bitmap.
    pub config: u32,
    /// `ofp_port_state` bitmap.
    pub state: u32,
    /// Current port features.
    pub curr: u32,
    /// Features advertised by this port.
    pub advertised: u32,
    /// Features supported by the port.
    pub supported: u32,
    /// Features advertised by the peer on the other end of the link.
    pub peer: u32,
}

impl PhyPort {
    /// Wire size: always 48 octets.
    pub fn len(&self) -> u16 {
        PHY_PORT_LEN as u16
    }

    /// Marshal to exactly [`PHY_PORT_LEN`] octets.
    pub fn marshal(&self) -> [u8; PHY_PORT_LEN] {
        let mut out = [0u8; PHY_PORT_LEN];
        out[0..2].copy_from_slice(&self.port_no.to_be_bytes());
        out[2..8].copy_from_slice(&self.hw_addr);
        out[8..24].copy_from_slice(&self.name);
        out[24..28].copy_from_slice(&self.config.to_be_bytes());
        out[28..32].copy_from_slice(&self.state.to_be_bytes());
        out[32..36].copy_from_slice(&self.curr.to_be_bytes());
        out[36..40].copy_from_slice(&self.advertised.to_be_bytes());
        out[40..44].copy_from_slice(&self.supported.to_be_bytes());
        out[44..48].copy_from_slice(&self.peer.to_be_bytes());
        out
    }

    /// Parse a port descriptor from the first [`PHY_PORT_LEN`] octets of `data`.
    pub fn unmarshal(data: &[u8]) -> Result<Self> {
        if data.len() < PHY_PORT_LEN {
            return Err(CodecError::Truncated { what: "phy_port", need: PHY_PORT_LEN, got: data.len() });
        }
        let mut hw_addr = [0u8; ETH_ALEN];
        hw_addr.copy_from_slice(&data[2..8]);
        let mut name = [0u8; MAX_PORT_NAME_LEN];
        name.copy_from_slice(&data[8..24]);
        #[allow(clippy::expect_used, reason = "slice width fixed by the PHY_PORT_LEN bounds check above")]
        let config = u32::from_be_bytes(data[24..28].try_into().expect("length checked"));
        #[allow(clippy::expect_used, reason = "slice width fixed by the PHY_PORT_LEN bounds check above")]
        let state = u32::from_be_bytes(data[28..32].try_into().expect("length checked"));
        #[allow(clippy::expect_used, reason = "slice width fixed by the PHY_PORT_LEN bounds check above")]
        let curr = u32::from_be_bytes(data[32..36].try_into().expect("length checked"));
        #[allow(clippy::expect_used, reason = "slice width fixed by the PHY_PORT_LEN bounds check above")]
        let advertised = u32::from_be_bytes(data[36..40].try_into().expect("length checked"));
        #[allow(clippy::expect_used, reason = "slice width fixed by the PHY_PORT_LEN bounds check above")]
        let supported = u32::from_be_bytes(data[40..44].try_into().expect("length checked"));
        #[allow(clippy::expect_used, reason = "slice width fixed by the PHY_PORT_LEN bounds check above")]
        let peer = u32::from_be_bytes(data[44..48].try_into().expect("length checked"));
        Ok(Self {
            port_no: u16::from_be_bytes([data[0], data[1]]),
            hw_addr,
            name,
            config,
            state,
            curr,
            advertised,
            supported,
            peer,
        })
    }

    /// Decode the null-padded name field into a `String`, stopping at the first NUL.
    pub fn name_str(&self) -> String {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(self.name.len());
        String::from_utf8_lossy(&self.name[..end]).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_port() -> PhyPort {
        PhyPort {
            port_no: 1,
            hw_addr: [0x02, 0x00, 0x00, 0x00, 0x00, 0x01],
            name: {
                let mut n = [0u8; MAX_PORT_NAME_LEN];
                n[..4].copy_from_slice(b"eth0");
                n
            },
            config: 0,
            state: 0,
            curr: features::HUNDRED_MB_FD | features::COPPER,
            advertised: 0,
            supported: 0,
            peer: 0,
        }
    }

    #[test]
    fn round_trips() {
        let port = sample_port();
        let wire = port.marshal();
        assert_eq!(wire.len(), PHY_PORT_LEN);
        let decoded = PhyPort::unmarshal(&wire).unwrap();
        assert_eq!(decoded, port);
        assert_eq!(decoded.name_str(), "eth0");
    }
}
