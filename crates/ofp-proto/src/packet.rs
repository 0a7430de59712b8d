//! `packet_in`/`packet_out`: the controller-switch packet-forwarding pair.

use crate::action::Action;
use crate::error::{CodecError, Result};
use crate::linklayer::Ethernet;

/// `ofp_packet_in_reason` values.
pub mod reason {
    /// No matching flow; the packet was sent to the controller by the table-miss default.
    pub const NO_MATCH: u8 = 0;
    /// A flow entry's explicit `OFPAT_OUTPUT` to `OFPP_CONTROLLER` action sent this packet.
    pub const ACTION: u8 = 1;
}

/// Switch-to-controller notification that a packet needs a forwarding decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketIn {
    /// Buffer id the switch holds the full packet under, or `0xFFFFFFFF` if `data` is the whole frame.
    pub buffer_id: u32,
    /// Full length of the frame, which may exceed `data.len()` when buffered.
    pub total_len: u16,
    /// Port the packet arrived on.
    pub in_port: u16,
    /// One of the [`reason`] constants.
    pub reason: u8,
    /// Captured frame bytes, beginning with the Ethernet header.
    pub data: Vec<u8>,
}

impl PacketIn {
    /// Fixed-body length (excluding the trailing frame): 10 octets.
    pub const FIXED_LEN: usize = 4 + 2 + 2 + 1 + 1;

    /// Total body length, including the captured frame.
    pub fn len(&self) -> u16 {
        Self::FIXED_LEN as u16 + self.data.len() as u16
    }

    /// Marshal the message body.
    pub fn marshal(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len() as usize);
        out.extend_from_slice(&self.buffer_id.to_be_bytes());
        out.extend_from_slice(&self.total_len.to_be_bytes());
        out.extend_from_slice(&self.in_port.to_be_bytes());
        out.push(self.reason);
        out.push(0); // pad
        out.extend_from_slice(&self.data);
        out
    }

    /// Parse the message body. `body_len` bounds the trailing captured frame.
    pub fn unmarshal(data: &[u8], body_len: usize) -> Result<Self> {
        if data.len() < Self::FIXED_LEN || body_len < Self::FIXED_LEN {
            return Err(CodecError::Truncated { what: "packet_in", need: Self::FIXED_LEN, got: data.len() });
        }
        #[allow(clippy::expect_used, reason = "slice width fixed by the FIXED_LEN bounds check above")]
        let buffer_id = u32::from_be_bytes(data[0..4].try_into().expect("length checked"));
        Ok(Self {
            buffer_id,
            total_len: u16::from_be_bytes([data[4], data[5]]),
            in_port: u16::from_be_bytes([data[6], data[7]]),
            reason: data[8],
            data: data[Self::FIXED_LEN..body_len.min(data.len())].to_vec(),
        })
    }

    /// Parse the captured frame as an Ethernet II frame, per §4.1's `packet_in`
    /// payload walk. The controller core never does this itself; it is here
    /// for applications that need the parsed link layer.
    pub fn ethernet(&self) -> Result<Ethernet> {
        Ethernet::unmarshal(&self.data)
    }
}

/// Controller-to-switch command to emit a packet, optionally with actions applied first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketOut {
    /// Buffer id of a packet already held by the switch, or `0xFFFFFFFF` if `data` carries the frame.
    pub buffer_id: u32,
    /// Port the packet is considered to have arrived on (used for `IN_PORT` actions), or `NONE`.
    pub in_port: u16,
    /// Actions to apply before forwarding.
    pub actions: Vec<Action>,
    /// Raw frame bytes; only sent on the wire when `buffer_id == 0xFFFF_FFFF`.
    pub data: Vec<u8>,
}

impl PacketOut {
    /// Fixed-body length (excluding actions and the trailing frame): 8 octets.
    pub const FIXED_LEN: usize = 4 + 2 + 2;

    /// Total body length.
    pub fn len(&self) -> u16 {
        let actions_len: u16 = self.actions.iter().map(Action::len).sum();
        let data_len: u16 = if self.buffer_id == 0xFFFF_FFFF { self.data.len() as u16 } else { 0 };
        Self::FIXED_LEN as u16 + actions_len + data_len
    }

    /// Marshal the message body.
    pub fn marshal(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len() as usize);
        out.extend_from_slice(&self.buffer_id.to_be_bytes());
        out.extend_from_slice(&self.in_port.to_be_bytes());
        let actions_len: u16 = self.actions.iter().map(Action::len).sum();
        out.extend_from_slice(&actions_len.to_be_bytes());
        out.extend_from_slice(&Action::marshal_list(&self.actions));
        if self.buffer_id == 0xFFFF_FFFF {
            out.extend_from_slice(&self.data);
        }
        out
    }

    /// Parse the message body. `body_len` bounds the trailing frame, if present.
    pub fn unmarshal(data: &[u8], body_len: usize) -> Result<Self> {
        if data.len() < Self::FIXED_LEN || body_len < Self::FIXED_LEN {
            return Err(CodecError::Truncated { what: "packet_out", need: Self::FIXED_LEN, got: data.len() });
        }
        #[allow(clippy::expect_used, reason = "slice width fixed by the FIXED_LEN bounds check above")]
        let buffer_id = u32::from_be_bytes(data[0..4].try_into().expect("length checked"));
        let in_port = u16::from_be_bytes([data[4], data[5]]);
        let actions_len = u16::from_be_bytes([data[6], data[7]]) as usize;
        let body_end = body_len.min(data.len());
        if Self::FIXED_LEN + actions_len > body_end {
            return Err(CodecError::Truncated { what: "packet_out actions", need: actions_len, got: body_end - Self::FIXED_LEN });
        }
        let actions = Action::unmarshal_list(&data[Self::FIXED_LEN..Self::FIXED_LEN + actions_len])?;
        let frame_start = Self::FIXED_LEN + actions_len;
        let data = if buffer_id == 0xFFFF_FFFF { data[frame_start..body_end].to_vec() } else { Vec::new() };
        Ok(Self { buffer_id, in_port, actions, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packet_in_round_trips_with_captured_frame() {
        let packet_in = PacketIn {
            buffer_id: 7,
            total_len: 64,
            in_port: 1,
            reason: reason::NO_MATCH,
            data: vec![0xaa; 64],
        };
        let body = packet_in.marshal();
        assert_eq!(body.len() as u16, packet_in.len());
        let decoded = PacketIn::unmarshal(&body, body.len()).unwrap();
        assert_eq!(decoded, packet_in);
    }

    #[test]
    fn packet_out_with_buffered_packet_omits_frame() {
        let packet_out = PacketOut {
            buffer_id: 42,
            in_port: crate::port::special::NONE,
            actions: vec![Action::Output { port: 3, max_len: 0 }],
            data: vec![1, 2, 3],
        };
        let body = packet_out.marshal();
        assert_eq!(body.len(), PacketOut::FIXED_LEN + 8);
        let decoded = PacketOut::unmarshal(&body, body.len()).unwrap();
        assert_eq!(decoded.buffer_id, 42);
        assert_eq!(decoded.actions, packet_out.actions);
        assert!(decoded.data.is_empty());
    }

    #[test]
    fn packet_out_with_raw_frame_round_trips() {
        let packet_out = PacketOut {
            buffer_id: 0xFFFF_FFFF,
            in_port: crate::port::special::NONE,
            actions: vec![Action::Output { port: crate::port::special::FLOOD, max_len: 0 }],
            data: vec![0xde, 0xad, 0xbe, 0xef],
        };
        let body = packet_out.marshal();
        let decoded = PacketOut::unmarshal(&body, body.len()).unwrap();
        assert_eq!(decoded, packet_out);
    }
}
