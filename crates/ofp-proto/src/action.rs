//! Flow-mod and packet-out actions: a tagged sum with a common 4-byte header.

use crate::error::{CodecError, Result};

/// `ofp_action_type` wire tags.
mod type_tag {
    pub const OUTPUT: u16 = 0;
    pub const SET_VLAN_VID: u16 = 1;
    pub const SET_VLAN_PCP: u16 = 2;
    pub const STRIP_VLAN: u16 = 3;
    pub const SET_DL_SRC: u16 = 4;
    pub const SET_DL_DST: u16 = 5;
    pub const SET_NW_SRC: u16 = 6;
    pub const SET_NW_DST: u16 = 7;
    pub const SET_NW_TOS: u16 = 8;
    pub const SET_TP_SRC: u16 = 9;
    pub const SET_TP_DST: u16 = 10;
    pub const ENQUEUE: u16 = 11;
    pub const VENDOR: u16 = 0xFFFF;
}

/// A single flow-mod/packet-out action.
///
/// Every variant begins, on the wire, with a common 4-byte header (16-bit
/// type, 16-bit length); [`Action::marshal`]/[`Action::unmarshal`] handle
/// that header transparently. An unrecognised type tag decodes to
/// [`Action::Opaque`] rather than failing or truncating the remainder of the
/// action list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Output to a port, with an optional max length for controller-bound copies.
    Output {
        /// Output port, or one of the [`crate::port::special`] reserved values.
        port: u16,
        /// Maximum number of bytes to send to the controller; `0xFFFF` means "no limit".
        max_len: u16,
    },
    /// Set the 802.1Q VLAN id.
    SetVlanVid(u16),
    /// Set the 802.1Q VLAN priority (3 bits).
    SetVlanPcp(u8),
    /// Strip the 802.1Q VLAN header.
    StripVlan,
    /// Set the Ethernet source address.
    SetDlSrc([u8; 6]),
    /// Set the Ethernet destination address.
    SetDlDst([u8; 6]),
    /// Set the IPv4 source address.
    SetNwSrc([u8; 4]),
    /// Set the IPv4 destination address.
    SetNwDst([u8; 4]),
    /// Set the IP ToS field.
    SetNwTos(u8),
    /// Set the TCP/UDP source port.
    SetTpSrc(u16),
    /// Set the TCP/UDP destination port.
    SetTpDst(u16),
    /// Enqueue on a specific queue attached to a port.
    Enqueue {
        /// Output port owning the queue.
        port: u16,
        /// Queue id on that port.
        queue_id: u32,
    },
    /// Vendor-specific action carrying a vendor id and opaque body.
    Vendor {
        /// Vendor identifier.
        vendor: u32,
        /// Vendor-defined body octets.
        body: Vec<u8>,
    },
    /// An action type this codec does not recognise, preserved verbatim.
    Opaque {
        /// The unrecognised type tag.
        action_type: u16,
        /// The action body, excluding the 4-byte common header.
        body: Vec<u8>,
    },
}

impl Action {
    /// Total wire length of this action, always a multiple of 8.
    pub fn len(&self) -> u16 {
        let body_len: u16 = match self {
            Self::Output { .. } => 4,
            Self::SetVlanVid(_) => 4,
            Self::SetVlanPcp(_) => 4,
            Self::StripVlan => 4,
            Self::SetDlSrc(_) | Self::SetDlDst(_) => 12,
            Self::SetNwSrc(_) | Self::SetNwDst(_) => 4,
            Self::SetNwTos(_) => 4,
            Self::SetTpSrc(_) | Self::SetTpDst(_) => 4,
            Self::Enqueue { .. } => 12,
            Self::Vendor { body, .. } => 4 + body.len() as u16,
            Self::Opaque { body, .. } => body.len() as u16,
        };
        4 + body_len
    }

    fn type_tag(&self) -> u16 {
        match self {
            Self::Output { .. } => type_tag::OUTPUT,
            Self::SetVlanVid(_) => type_tag::SET_VLAN_VID,
            Self::SetVlanPcp(_) => type_tag::SET_VLAN_PCP,
            Self::StripVlan => type_tag::STRIP_VLAN,
            Self::SetDlSrc(_) => type_tag::SET_DL_SRC,
            Self::SetDlDst(_) => type_tag::SET_DL_DST,
            Self::SetNwSrc(_) => type_tag::SET_NW_SRC,
            Self::SetNwDst(_) => type_tag::SET_NW_DST,
            Self::SetNwTos(_) => type_tag::SET_NW_TOS,
            Self::SetTpSrc(_) => type_tag::SET_TP_SRC,
            Self::SetTpDst(_) => type_tag::SET_TP_DST,
            Self::Enqueue { .. } => type_tag::ENQUEUE,
            Self::Vendor { .. } => type_tag::VENDOR,
            Self::Opaque { action_type, .. } => *action_type,
        }
    }

    /// Marshal this action, including its 4-byte common header.
    pub fn marshal(&self) -> Vec<u8> {
        let len = self.len();
        let mut out = Vec::with_capacity(len as usize);
        out.extend_from_slice(&self.type_tag().to_be_bytes());
        out.extend_from_slice(&len.to_be_bytes());
        match self {
            Self::Output { port, max_len } => {
                out.extend_from_slice(&port.to_be_bytes());
                out.extend_from_slice(&max_len.to_be_bytes());
            },
            Self::SetVlanVid(vid) => {
                out.extend_from_slice(&vid.to_be_bytes());
                out.extend_from_slice(&[0, 0]);
            },
            Self::SetVlanPcp(pcp) => {
                out.push(*pcp);
                out.extend_from_slice(&[0, 0, 0]);
            },
            Self::StripVlan => out.extend_from_slice(&[0, 0, 0, 0]),
            Self::SetDlSrc(addr) | Self::SetDlDst(addr) => {
                out.extend_from_slice(addr);
                out.extend_from_slice(&[0u8; 6]);
            },
            Self::SetNwSrc(addr) | Self::SetNwDst(addr) => out.extend_from_slice(addr),
            Self::SetNwTos(tos) => {
                out.push(*tos);
                out.extend_from_slice(&[0, 0, 0]);
            },
            Self::SetTpSrc(port) | Self::SetTpDst(port) => {
                out.extend_from_slice(&port.to_be_bytes());
                out.extend_from_slice(&[0, 0]);
            },
            Self::Enqueue { port, queue_id } => {
                out.extend_from_slice(&port.to_be_bytes());
                out.extend_from_slice(&[0u8; 6]);
                out.extend_from_slice(&queue_id.to_be_bytes());
            },
            Self::Vendor { vendor, body } => {
                out.extend_from_slice(&vendor.to_be_bytes());
                out.extend_from_slice(body);
            },
            Self::Opaque { body, .. } => out.extend_from_slice(body),
        }
        out
    }

    /// Decode a single action from the head of `data`, returning it and the
    /// number of octets consumed. An unrecognised type tag yields
    /// [`Action::Opaque`] rather than an error.
    pub fn unmarshal(data: &[u8]) -> Result<(Self, usize)> {
        if data.len() < 4 {
            return Err(CodecError::Truncated { what: "action header", need: 4, got: data.len() });
        }
        let action_type = u16::from_be_bytes([data[0], data[1]]);
        let len = u16::from_be_bytes([data[2], data[3]]);
        if len < 4 || (len % 8 != 0) || data.len() < len as usize {
            return Err(CodecError::MalformedAction(len));
        }
        let body = &data[4..len as usize];

        let action = match action_type {
            type_tag::OUTPUT if body.len() >= 4 => Self::Output {
                port: u16::from_be_bytes([body[0], body[1]]),
                max_len: u16::from_be_bytes([body[2], body[3]]),
            },
            type_tag::SET_VLAN_VID if body.len() >= 2 => {
                Self::SetVlanVid(u16::from_be_bytes([body[0], body[1]]))
            },
            type_tag::SET_VLAN_PCP if !body.is_empty() => Self::SetVlanPcp(body[0]),
            type_tag::STRIP_VLAN => Self::StripVlan,
            type_tag::SET_DL_SRC if body.len() >= 6 => {
                let mut addr = [0u8; 6];
                addr.copy_from_slice(&body[0..6]);
                Self::SetDlSrc(addr)
            },
            type_tag::SET_DL_DST if body.len() >= 6 => {
                let mut addr = [0u8; 6];
                addr.copy_from_slice(&body[0..6]);
                Self::SetDlDst(addr)
            },
            type_tag::SET_NW_SRC if body.len() >= 4 => {
                let mut addr = [0u8; 4];
                addr.copy_from_slice(&body[0..4]);
                Self::SetNwSrc(addr)
            },
            type_tag::SET_NW_DST if body.len() >= 4 => {
                let mut addr = [0u8; 4];
                addr.copy_from_slice(&body[0..4]);
                Self::SetNwDst(addr)
            },
            type_tag::SET_NW_TOS if !body.is_empty() => Self::SetNwTos(body[0]),
            type_tag::SET_TP_SRC if body.len() >= 2 => {
                Self::SetTpSrc(u16::from_be_bytes([body[0], body[1]]))
            },
            type_tag::SET_TP_DST if body.len() >= 2 => {
                Self::SetTpDst(u16::from_be_bytes([body[0], body[1]]))
            },
            type_tag::ENQUEUE if body.len() >= 12 => {
                #[allow(clippy::expect_used, reason = "slice width fixed by the body.len() guard above")]
                let queue_id = u32::from_be_bytes(body[8..12].try_into().expect("length checked"));
                Self::Enqueue { port: u16::from_be_bytes([body[0], body[1]]), queue_id }
            },
            type_tag::VENDOR if body.len() >= 4 => {
                #[allow(clippy::expect_used, reason = "slice width fixed by the body.len() guard above")]
                let vendor = u32::from_be_bytes(body[0..4].try_into().expect("length checked"));
                Self::Vendor { vendor, body: body[4..].to_vec() }
            },
            _ => Self::Opaque { action_type, body: body.to_vec() },
        };
        Ok((action, len as usize))
    }

    /// Decode a list of actions occupying exactly `data`, consuming until exhausted.
    pub fn unmarshal_list(mut data: &[u8]) -> Result<Vec<Self>> {
        let mut actions = Vec::new();
        while !data.is_empty() {
            let (action, consumed) = Self::unmarshal(data)?;
            actions.push(action);
            data = &data[consumed..];
        }
        Ok(actions)
    }

    /// Marshal a list of actions back-to-back.
    pub fn marshal_list(actions: &[Self]) -> Vec<u8> {
        let mut out = Vec::new();
        for action in actions {
            out.extend_from_slice(&action.marshal());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_round_trips_scenario_3() {
        let action = Action::Output { port: 2, max_len: 256 };
        let wire = action.marshal();
        assert_eq!(wire.len(), 8);
        let (decoded, consumed) = Action::unmarshal(&wire).unwrap();
        assert_eq!(consumed, 8);
        assert_eq!(decoded, action);
    }

    #[test]
    fn unknown_type_preserved_as_opaque_without_truncating_list() {
        let mut data = Vec::new();
        // unknown type 0x2000, len 8
        data.extend_from_slice(&0x2000u16.to_be_bytes());
        data.extend_from_slice(&8u16.to_be_bytes());
        data.extend_from_slice(&[1, 2, 3, 4]);
        // followed by a real output action
        data.extend_from_slice(&Action::Output { port: 5, max_len: 0 }.marshal());

        let actions = Action::unmarshal_list(&data).unwrap();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0], Action::Opaque { action_type: 0x2000, body: vec![1, 2, 3, 4] });
        assert_eq!(actions[1], Action::Output { port: 5, max_len: 0 });
    }

    #[test]
    fn enqueue_round_trips() {
        let action = Action::Enqueue { port: 3, queue_id: 7 };
        let wire = action.marshal();
        assert_eq!(wire.len(), 16);
        assert_eq!(Action::unmarshal(&wire).unwrap().0, action);
    }
}
