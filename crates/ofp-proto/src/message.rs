//! The full v1.0 message set as a single tagged sum, decided once at decode
//! time and carried structurally from then on rather than re-inspected by
//! message type at each consumer.

use crate::config::SwitchConfig;
use crate::error::{CodecError, Result};
use crate::error_msg::ErrorMsg;
use crate::features::FeaturesReply;
use crate::flow::{FlowMod, FlowRemoved};
use crate::header::{Header, MessageType, HEADER_LEN};
use crate::packet::{PacketIn, PacketOut};
use crate::port_mod::PortMod;
use crate::port_status::PortStatus;
use crate::stats::StatsBody;
use crate::vendor::VendorMsg;

/// The body of a message, one variant per `ofp_type` value.
///
/// A few message types (`hello`, `features_request`, `get_config_request`,
/// `barrier_request`, `barrier_reply`) carry no body in v1.0 and are unit
/// variants here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    /// `OFPT_HELLO`; carries no body in v1.0.
    Hello,
    /// `OFPT_ERROR`.
    Error(ErrorMsg),
    /// `OFPT_ECHO_REQUEST`; payload is echoed back verbatim by the peer.
    EchoRequest(Vec<u8>),
    /// `OFPT_ECHO_REPLY`.
    EchoReply(Vec<u8>),
    /// `OFPT_VENDOR`.
    Vendor(VendorMsg),
    /// `OFPT_FEATURES_REQUEST`; carries no body.
    FeaturesRequest,
    /// `OFPT_FEATURES_REPLY`.
    FeaturesReply(FeaturesReply),
    /// `OFPT_GET_CONFIG_REQUEST`; carries no body.
    GetConfigRequest,
    /// `OFPT_GET_CONFIG_REPLY`.
    GetConfigReply(SwitchConfig),
    /// `OFPT_SET_CONFIG`.
    SetConfig(SwitchConfig),
    /// `OFPT_PACKET_IN`.
    PacketIn(PacketIn),
    /// `OFPT_FLOW_REMOVED`.
    FlowRemoved(FlowRemoved),
    /// `OFPT_PORT_STATUS`.
    PortStatus(PortStatus),
    /// `OFPT_PACKET_OUT`.
    PacketOut(PacketOut),
    /// `OFPT_FLOW_MOD`.
    FlowMod(FlowMod),
    /// `OFPT_PORT_MOD`.
    PortMod(PortMod),
    /// `OFPT_STATS_REQUEST`.
    StatsRequest {
        /// [`crate::stats::stats_type`] discriminator.
        stats_type: u16,
        /// Reserved request flags; always [`crate::stats::STATS_FLAGS_NONE`] in v1.0.
        flags: u16,
        /// Type-dispatched request body.
        body: StatsBody,
    },
    /// `OFPT_STATS_REPLY`.
    StatsReply {
        /// [`crate::stats::stats_type`] discriminator.
        stats_type: u16,
        /// `OFPSF_REPLY_MORE` and friends; opaque to this codec.
        flags: u16,
        /// Type-dispatched reply body.
        body: StatsBody,
    },
    /// `OFPT_BARRIER_REQUEST`; carries no body.
    BarrierRequest,
    /// `OFPT_BARRIER_REPLY`; carries no body.
    BarrierReply,
    /// `OFPT_QUEUE_GET_CONFIG_REQUEST`.
    QueueGetConfigRequest {
        /// Port to query queue configuration for.
        port: u16,
    },
    /// `OFPT_QUEUE_GET_CONFIG_REPLY`.
    QueueGetConfigReply {
        /// Port the reply describes.
        port: u16,
        /// Queue-descriptor list, carried opaquely: queue structures are outside
        /// this codec's scope (the core forwards them; no layer here interprets them).
        data: Vec<u8>,
    },
}

impl MessageBody {
    /// The `ofp_type` this body's wire representation will carry.
    pub fn msg_type(&self) -> MessageType {
        match self {
            Self::Hello => MessageType::Hello,
            Self::Error(_) => MessageType::Error,
            Self::EchoRequest(_) => MessageType::EchoRequest,
            Self::EchoReply(_) => MessageType::EchoReply,
            Self::Vendor(_) => MessageType::Vendor,
            Self::FeaturesRequest => MessageType::FeaturesRequest,
            Self::FeaturesReply(_) => MessageType::FeaturesReply,
            Self::GetConfigRequest => MessageType::GetConfigRequest,
            Self::GetConfigReply(_) => MessageType::GetConfigReply,
            Self::SetConfig(_) => MessageType::SetConfig,
            Self::PacketIn(_) => MessageType::PacketIn,
            Self::FlowRemoved(_) => MessageType::FlowRemoved,
            Self::PortStatus(_) => MessageType::PortStatus,
            Self::PacketOut(_) => MessageType::PacketOut,
            Self::FlowMod(_) => MessageType::FlowMod,
            Self::PortMod(_) => MessageType::PortMod,
            Self::StatsRequest { .. } => MessageType::StatsRequest,
            Self::StatsReply { .. } => MessageType::StatsReply,
            Self::BarrierRequest => MessageType::BarrierRequest,
            Self::BarrierReply => MessageType::BarrierReply,
            Self::QueueGetConfigRequest { .. } => MessageType::QueueGetConfigRequest,
            Self::QueueGetConfigReply { .. } => MessageType::QueueGetConfigReply,
        }
    }

    fn marshal(&self) -> Vec<u8> {
        match self {
            Self::Hello | Self::FeaturesRequest | Self::GetConfigRequest | Self::BarrierRequest | Self::BarrierReply => Vec::new(),
            Self::Error(e) => e.marshal(),
            Self::EchoRequest(data) | Self::EchoReply(data) => data.clone(),
            Self::Vendor(v) => v.marshal(),
            Self::FeaturesReply(f) => f.marshal(),
            Self::GetConfigReply(c) | Self::SetConfig(c) => c.marshal().to_vec(),
            Self::PacketIn(p) => p.marshal(),
            Self::FlowRemoved(f) => f.marshal().to_vec(),
            Self::PortStatus(p) => p.marshal(),
            Self::PacketOut(p) => p.marshal(),
            Self::FlowMod(f) => f.marshal(),
            Self::PortMod(p) => p.marshal().to_vec(),
            Self::StatsRequest { stats_type, flags, body } | Self::StatsReply { stats_type, flags, body } => {
                let mut out = Vec::new();
                out.extend_from_slice(&stats_type.to_be_bytes());
                out.extend_from_slice(&flags.to_be_bytes());
                out.extend_from_slice(&body.marshal());
                out
            },
            Self::QueueGetConfigRequest { port } => {
                let mut out = vec![0u8; 4];
                out[0..2].copy_from_slice(&port.to_be_bytes());
                out
            },
            Self::QueueGetConfigReply { port, data } => {
                let mut out = vec![0u8; 8];
                out[0..2].copy_from_slice(&port.to_be_bytes());
                out.extend_from_slice(data);
                out
            },
        }
    }

    fn unmarshal(msg_type: MessageType, data: &[u8], body_len: usize) -> Result<Self> {
        Ok(match msg_type {
            MessageType::Hello => Self::Hello,
            MessageType::FeaturesRequest => Self::FeaturesRequest,
            MessageType::GetConfigRequest => Self::GetConfigRequest,
            MessageType::BarrierRequest => Self::BarrierRequest,
            MessageType::BarrierReply => Self::BarrierReply,
            MessageType::Error => Self::Error(ErrorMsg::unmarshal(&data[..body_len.min(data.len())])?),
            MessageType::EchoRequest => Self::EchoRequest(data[..body_len.min(data.len())].to_vec()),
            MessageType::EchoReply => Self::EchoReply(data[..body_len.min(data.len())].to_vec()),
            MessageType::Vendor => Self::Vendor(VendorMsg::unmarshal(data, body_len)?),
            MessageType::FeaturesReply => Self::FeaturesReply(FeaturesReply::unmarshal(data, body_len)?),
            MessageType::GetConfigReply => Self::GetConfigReply(SwitchConfig::unmarshal(data)?),
            MessageType::SetConfig => Self::SetConfig(SwitchConfig::unmarshal(data)?),
            MessageType::PacketIn => Self::PacketIn(PacketIn::unmarshal(data, body_len)?),
            MessageType::FlowRemoved => Self::FlowRemoved(FlowRemoved::unmarshal(data)?),
            MessageType::PortStatus => Self::PortStatus(PortStatus::unmarshal(data)?),
            MessageType::PacketOut => Self::PacketOut(PacketOut::unmarshal(data, body_len)?),
            MessageType::FlowMod => Self::FlowMod(FlowMod::unmarshal(data, body_len)?),
            MessageType::PortMod => Self::PortMod(PortMod::unmarshal(data)?),
            MessageType::StatsRequest | MessageType::StatsReply => {
                if data.len() < 4 || body_len < 4 {
                    return Err(CodecError::Truncated { what: "stats header", need: 4, got: data.len() });
                }
                let stats_type = u16::from_be_bytes([data[0], data[1]]);
                let flags = u16::from_be_bytes([data[2], data[3]]);
                let is_request = msg_type == MessageType::StatsRequest;
                let body = StatsBody::unmarshal(stats_type, is_request, &data[4..body_len.min(data.len())])?;
                if is_request {
                    Self::StatsRequest { stats_type, flags, body }
                } else {
                    Self::StatsReply { stats_type, flags, body }
                }
            },
            MessageType::QueueGetConfigRequest => {
                if data.len() < 2 {
                    return Err(CodecError::Truncated { what: "queue_get_config_request", need: 2, got: data.len() });
                }
                Self::QueueGetConfigRequest { port: u16::from_be_bytes([data[0], data[1]]) }
            },
            MessageType::QueueGetConfigReply => {
                if data.len() < 8 || body_len < 8 {
                    return Err(CodecError::Truncated { what: "queue_get_config_reply", need: 8, got: data.len() });
                }
                Self::QueueGetConfigReply {
                    port: u16::from_be_bytes([data[0], data[1]]),
                    data: data[8..body_len.min(data.len())].to_vec(),
                }
            },
        })
    }
}

/// A complete decoded message: the transaction id plus its type-dispatched body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Transaction id; echoes a request's xid on replies, or is freshly
    /// allocated (see [`crate::header::XidGenerator`]) on controller-originated requests.
    pub xid: u32,
    /// The decoded, type-dispatched body.
    pub body: MessageBody,
}

impl Message {
    /// Build a message from a body and transaction id.
    pub fn new(xid: u32, body: MessageBody) -> Self {
        Self { xid, body }
    }

    /// The `ofp_type` this message will carry on the wire.
    pub fn msg_type(&self) -> MessageType {
        self.body.msg_type()
    }

    /// Marshal the full message, including its 8-byte header.
    pub fn encode(&self) -> Vec<u8> {
        let body = self.body.marshal();
        let header = Header::new(self.msg_type(), HEADER_LEN as u16 + body.len() as u16, self.xid);
        let mut out = Vec::with_capacity(header.length as usize);
        out.extend_from_slice(&header.marshal());
        out.extend_from_slice(&body);
        out
    }

    /// Decode a full message, including its header, from `data`. `data` may
    /// contain trailing bytes belonging to the next message; only the first
    /// `header.length` octets are consumed.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let header = Header::unmarshal(data)?;
        let total = header.length as usize;
        if data.len() < total {
            return Err(CodecError::Truncated { what: "message body", need: total, got: data.len() });
        }
        let body_len = total - HEADER_LEN;
        let body = MessageBody::unmarshal(header.msg_type, &data[HEADER_LEN..total], body_len)?;
        Ok(Self { xid: header.xid, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::match_::Match;

    #[test]
    fn scenario_1_hello_round_trips() {
        let msg = Message::new(1, MessageBody::Hello);
        let wire = msg.encode();
        assert_eq!(wire, [0x01, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x01]);
        assert_eq!(Message::decode(&wire).unwrap(), msg);
    }

    #[test]
    fn echo_request_round_trips_with_payload() {
        let msg = Message::new(9, MessageBody::EchoRequest(vec![1, 2, 3, 4]));
        let wire = msg.encode();
        assert_eq!(Message::decode(&wire).unwrap(), msg);
    }

    #[test]
    fn scenario_3_flow_mod_round_trips_as_a_message() {
        let flow_mod = FlowMod {
            match_: Match::default()
                .with_dl_src([0x0a, 0, 0, 0, 0, 1])
                .with_dl_dst([0x0a, 0, 0, 0, 0, 2]),
            cookie: 0,
            command: crate::flow::command::ADD,
            idle_timeout: 3,
            hard_timeout: 0,
            priority: 1000,
            buffer_id: 0xFFFF_FFFF,
            out_port: 0,
            flags: 0,
            actions: vec![Action::Output { port: 2, max_len: 256 }],
        };
        let msg = Message::new(2, MessageBody::FlowMod(flow_mod));
        let wire = msg.encode();
        let decoded = Message::decode(&wire).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn decode_rejects_a_message_shorter_than_its_declared_length() {
        let wire = [0x01, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x01];
        assert!(Message::decode(&wire).is_err());
    }

    #[test]
    fn trailing_bytes_after_one_message_are_left_unconsumed() {
        let first = Message::new(1, MessageBody::Hello).encode();
        let second = Message::new(2, MessageBody::BarrierRequest).encode();
        let mut both = first.clone();
        both.extend_from_slice(&second);

        let decoded_first = Message::decode(&both).unwrap();
        assert_eq!(decoded_first, Message::new(1, MessageBody::Hello));
        let decoded_second = Message::decode(&both[first.len()..]).unwrap();
        assert_eq!(decoded_second, Message::new(2, MessageBody::BarrierRequest));
    }
}
