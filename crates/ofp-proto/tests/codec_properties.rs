//! Property-based round-trip tests for the OpenFlow 1.0 wire codec.
//!
//! These verify §8's round-trip laws hold for arbitrary values, not just the
//! handful of concrete scenarios exercised by the unit tests alongside each
//! type: `decode(encode(v)) == v`, and `encode(v).len() == v.declared_len()`.

use ofp_proto::action::Action;
use ofp_proto::header::{Header, MessageType};
use ofp_proto::match_::Match;
use ofp_proto::{Message, MessageBody};
use proptest::prelude::*;

fn arbitrary_mac() -> impl Strategy<Value = [u8; 6]> {
    any::<[u8; 6]>()
}

fn arbitrary_ipv4() -> impl Strategy<Value = [u8; 4]> {
    any::<[u8; 4]>()
}

fn arbitrary_match() -> impl Strategy<Value = Match> {
    (
        any::<u16>(),
        arbitrary_mac(),
        arbitrary_mac(),
        any::<u16>(),
        any::<u8>(),
        any::<u16>(),
        any::<u8>(),
        any::<u8>(),
        arbitrary_ipv4(),
        arbitrary_ipv4(),
        any::<u16>(),
        any::<u16>(),
    )
        .prop_map(
            |(in_port, dl_src, dl_dst, dl_vlan, dl_vlan_pcp, dl_type, nw_tos, nw_proto, nw_src, nw_dst, tp_src, tp_dst)| {
                Match {
                    wildcards: ofp_proto::match_::wildcards::ALL,
                    in_port,
                    dl_src,
                    dl_dst,
                    dl_vlan,
                    dl_vlan_pcp,
                    dl_type,
                    nw_tos,
                    nw_proto,
                    nw_src,
                    nw_dst,
                    tp_src,
                    tp_dst,
                }
            },
        )
}

fn arbitrary_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        (any::<u16>(), any::<u16>()).prop_map(|(port, max_len)| Action::Output { port, max_len }),
        any::<u16>().prop_map(Action::SetVlanVid),
        any::<u8>().prop_map(|pcp| Action::SetVlanPcp(pcp & 0x7)),
        Just(Action::StripVlan),
        arbitrary_mac().prop_map(Action::SetDlSrc),
        arbitrary_mac().prop_map(Action::SetDlDst),
        arbitrary_ipv4().prop_map(Action::SetNwSrc),
        arbitrary_ipv4().prop_map(Action::SetNwDst),
        any::<u8>().prop_map(Action::SetNwTos),
        any::<u16>().prop_map(Action::SetTpSrc),
        any::<u16>().prop_map(Action::SetTpDst),
        (any::<u16>(), any::<u32>()).prop_map(|(port, queue_id)| Action::Enqueue { port, queue_id }),
    ]
}

proptest! {
    #[test]
    fn header_round_trips_for_every_known_type(length in 8u16..=u16::MAX, xid in any::<u32>()) {
        for &msg_type in &[
            MessageType::Hello, MessageType::Error, MessageType::EchoRequest, MessageType::EchoReply,
            MessageType::Vendor, MessageType::FeaturesRequest, MessageType::FeaturesReply,
            MessageType::GetConfigRequest, MessageType::GetConfigReply, MessageType::SetConfig,
            MessageType::PacketIn, MessageType::FlowRemoved, MessageType::PortStatus, MessageType::PacketOut,
            MessageType::FlowMod, MessageType::PortMod, MessageType::StatsRequest, MessageType::StatsReply,
            MessageType::BarrierRequest, MessageType::BarrierReply, MessageType::QueueGetConfigRequest,
            MessageType::QueueGetConfigReply,
        ] {
            let header = Header::new(msg_type, length, xid);
            let wire = header.marshal();
            prop_assert_eq!(wire.len(), header.len() as usize);
            let decoded = Header::unmarshal(&wire)?;
            prop_assert_eq!(decoded, header);
        }
    }

    #[test]
    fn match_round_trips_and_declared_len_matches(m in arbitrary_match()) {
        let wire = m.marshal();
        prop_assert_eq!(wire.len(), m.len() as usize);
        let decoded = Match::unmarshal(&wire)?;
        prop_assert_eq!(decoded, m);
    }

    #[test]
    fn constraining_a_match_field_clears_exactly_its_wildcard_bit(
        m in arbitrary_match(),
        dl_src in arbitrary_mac(),
    ) {
        let before = m.wildcards;
        let constrained = m.with_dl_src(dl_src);
        prop_assert_eq!(constrained.wildcards, before & !ofp_proto::match_::wildcards::DL_SRC);
        let wire = constrained.marshal();
        prop_assert_eq!(Match::unmarshal(&wire)?, constrained);
    }

    #[test]
    fn single_action_round_trips_and_declared_len_is_a_multiple_of_eight(action in arbitrary_action()) {
        let wire = action.marshal();
        prop_assert_eq!(wire.len(), action.len() as usize);
        prop_assert_eq!(wire.len() % 8, 0);
        let (decoded, consumed) = Action::unmarshal(&wire)?;
        prop_assert_eq!(consumed, wire.len());
        prop_assert_eq!(decoded, action);
    }

    #[test]
    fn action_list_round_trips_without_reordering_or_truncation(actions in prop::collection::vec(arbitrary_action(), 0..8)) {
        let wire = Action::marshal_list(&actions);
        let decoded = Action::unmarshal_list(&wire)?;
        prop_assert_eq!(decoded, actions);
    }

    #[test]
    fn hello_message_round_trips_for_any_xid(xid in any::<u32>()) {
        let msg = Message::new(xid, MessageBody::Hello);
        let wire = msg.encode();
        prop_assert_eq!(wire.len(), 8);
        prop_assert_eq!(Message::decode(&wire)?, msg);
    }

    #[test]
    fn echo_payload_round_trips_for_arbitrary_bytes(xid in any::<u32>(), payload in prop::collection::vec(any::<u8>(), 0..256)) {
        let msg = Message::new(xid, MessageBody::EchoRequest(payload.clone()));
        let wire = msg.encode();
        prop_assert_eq!(wire.len(), 8 + payload.len());
        prop_assert_eq!(Message::decode(&wire)?, msg);
    }

    #[test]
    fn flow_mod_round_trips_with_an_arbitrary_match_and_action_set(
        m in arbitrary_match(),
        xid in any::<u32>(),
        priority in any::<u16>(),
        actions in prop::collection::vec(arbitrary_action(), 0..4),
    ) {
        let flow_mod = ofp_proto::flow::FlowMod {
            match_: m,
            cookie: 0,
            command: ofp_proto::flow::command::ADD,
            idle_timeout: 0,
            hard_timeout: 0,
            priority,
            buffer_id: 0xFFFF_FFFF,
            out_port: ofp_proto::port::special::NONE,
            flags: 0,
            actions,
        };
        let msg = Message::new(xid, MessageBody::FlowMod(flow_mod.clone()));
        let wire = msg.encode();
        let decoded = Message::decode(&wire)?;
        prop_assert_eq!(decoded, msg);
    }
}
