//! The 8-byte header common to every OpenFlow message, and the transaction-id
//! allocator used to mint ids for controller-originated messages.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::{CodecError, Result};

/// Wire size of the header, in octets.
pub const HEADER_LEN: usize = 8;

/// The OpenFlow 1.0 protocol version octet.
pub const VERSION_1_0: u8 = 0x01;

/// One-octet message-type tag, as carried in the header.
///
/// `From`/`TryFrom` conversions to and from `u8` give the wire encoding;
/// unrecognised values are rejected at decode time rather than silently
/// coerced to a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum MessageType {
    /// `OFPT_HELLO`
    Hello,
    /// `OFPT_ERROR`
    Error,
    /// `OFPT_ECHO_REQUEST`
    EchoRequest,
    /// `OFPT_ECHO_REPLY`
    EchoReply,
    /// `OFPT_VENDOR`
    Vendor,
    /// `OFPT_FEATURES_REQUEST`
    FeaturesRequest,
    /// `OFPT_FEATURES_REPLY`
    FeaturesReply,
    /// `OFPT_GET_CONFIG_REQUEST`
    GetConfigRequest,
    /// `OFPT_GET_CONFIG_REPLY`
    GetConfigReply,
    /// `OFPT_SET_CONFIG`
    SetConfig,
    /// `OFPT_PACKET_IN`
    PacketIn,
    /// `OFPT_FLOW_REMOVED`
    FlowRemoved,
    /// `OFPT_PORT_STATUS`
    PortStatus,
    /// `OFPT_PACKET_OUT`
    PacketOut,
    /// `OFPT_FLOW_MOD`
    FlowMod,
    /// `OFPT_PORT_MOD`
    PortMod,
    /// `OFPT_STATS_REQUEST`
    StatsRequest,
    /// `OFPT_STATS_REPLY`
    StatsReply,
    /// `OFPT_BARRIER_REQUEST`
    BarrierRequest,
    /// `OFPT_BARRIER_REPLY`
    BarrierReply,
    /// `OFPT_QUEUE_GET_CONFIG_REQUEST`
    QueueGetConfigRequest,
    /// `OFPT_QUEUE_GET_CONFIG_REPLY`
    QueueGetConfigReply,
}

impl MessageType {
    /// Decode the one-octet wire tag, failing for values outside the v1.0 enumeration.
    pub fn from_wire(tag: u8) -> Result<Self> {
        Ok(match tag {
            0 => Self::Hello,
            1 => Self::Error,
            2 => Self::EchoRequest,
            3 => Self::EchoReply,
            4 => Self::Vendor,
            5 => Self::FeaturesRequest,
            6 => Self::FeaturesReply,
            7 => Self::GetConfigRequest,
            8 => Self::GetConfigReply,
            9 => Self::SetConfig,
            10 => Self::PacketIn,
            11 => Self::FlowRemoved,
            12 => Self::PortStatus,
            13 => Self::PacketOut,
            14 => Self::FlowMod,
            15 => Self::PortMod,
            16 => Self::StatsRequest,
            17 => Self::StatsReply,
            18 => Self::BarrierRequest,
            19 => Self::BarrierReply,
            20 => Self::QueueGetConfigRequest,
            21 => Self::QueueGetConfigReply,
            other => return Err(CodecError::UnknownMessageType(other)),
        })
    }

    /// Encode to the one-octet wire tag.
    pub fn to_wire(self) -> u8 {
        match self {
            Self::Hello => 0,
            Self::Error => 1,
            Self::EchoRequest => 2,
            Self::EchoReply => 3,
            Self::Vendor => 4,
            Self::FeaturesRequest => 5,
            Self::FeaturesReply => 6,
            Self::GetConfigRequest => 7,
            Self::GetConfigReply => 8,
            Self::SetConfig => 9,
            Self::PacketIn => 10,
            Self::FlowRemoved => 11,
            Self::PortStatus => 12,
            Self::PacketOut => 13,
            Self::FlowMod => 14,
            Self::PortMod => 15,
            Self::StatsRequest => 16,
            Self::StatsReply => 17,
            Self::BarrierRequest => 18,
            Self::BarrierReply => 19,
            Self::QueueGetConfigRequest => 20,
            Self::QueueGetConfigReply => 21,
        }
    }
}

/// The 8-byte header every OpenFlow message begins with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Protocol version; `0x01` for OpenFlow 1.0.
    pub version: u8,
    /// Message-type tag.
    pub msg_type: MessageType,
    /// Total length of the message, including this header.
    pub length: u16,
    /// Transaction id correlating replies with requests.
    pub xid: u32,
}

impl Header {
    /// Construct a header for a message of the given type and total length.
    pub fn new(msg_type: MessageType, length: u16, xid: u32) -> Self {
        Self { version: VERSION_1_0, msg_type, length, xid }
    }

    /// Wire size of the header: always 8 octets.
    pub fn len(&self) -> u16 {
        HEADER_LEN as u16
    }

    /// Marshal to exactly [`HEADER_LEN`] octets.
    pub fn marshal(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0] = self.version;
        out[1] = self.msg_type.to_wire();
        out[2..4].copy_from_slice(&self.length.to_be_bytes());
        out[4..8].copy_from_slice(&self.xid.to_be_bytes());
        out
    }

    /// Parse a header from the first [`HEADER_LEN`] octets of `data`.
    pub fn unmarshal(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_LEN {
            return Err(CodecError::Truncated { what: "header", need: HEADER_LEN, got: data.len() });
        }
        let length = u16::from_be_bytes([data[2], data[3]]);
        if (length as usize) < HEADER_LEN {
            return Err(CodecError::LengthTooShort(length));
        }
        Ok(Self {
            version: data[0],
            msg_type: MessageType::from_wire(data[1])?,
            length,
            xid: u32::from_be_bytes([data[4], data[5], data[6], data[7]]),
        })
    }
}

/// Process-wide monotonically increasing transaction-id allocator, seeded at 1.
///
/// Used to mint xids for controller-originated messages (features-request,
/// barrier-request, stats-request, and so on). Wrap-around is tolerated: the
/// counter simply wraps past `u32::MAX` back to 0.
#[derive(Debug)]
pub struct XidGenerator(AtomicU32);

impl XidGenerator {
    /// Build a generator seeded at 1, per the transaction-id allocator invariant.
    pub fn new() -> Self {
        Self(AtomicU32::new(1))
    }

    /// Allocate the next transaction id.
    pub fn next(&self) -> u32 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for XidGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hello_round_trip_scenario_1() {
        let input = [0x01, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x01];
        let header = Header::unmarshal(&input).unwrap();
        assert_eq!(header.version, 1);
        assert_eq!(header.msg_type, MessageType::Hello);
        assert_eq!(header.length, 8);
        assert_eq!(header.xid, 1);
        assert_eq!(header.marshal(), input);
    }

    #[test]
    fn xid_generator_seeds_at_one_and_increments() {
        let gen = XidGenerator::new();
        assert_eq!(gen.next(), 1);
        assert_eq!(gen.next(), 2);
        assert_eq!(gen.next(), 3);
    }

    #[test]
    fn rejects_truncated_header() {
        assert!(Header::unmarshal(&[0x01, 0x00]).is_err());
    }

    #[test]
    fn rejects_unknown_message_type() {
        let bytes = [0x01, 0xFF, 0x00, 0x08, 0x00, 0x00, 0x00, 0x01];
        assert!(Header::unmarshal(&bytes).is_err());
    }
}
