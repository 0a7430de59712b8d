//! Link-discovery loop: announces this controller's view of each switch to
//! its neighbours and reconstructs link state from what comes back (§4.5).

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use ofp_core::{Application, Link, Registry};
use ofp_proto::action::Action;
use ofp_proto::linklayer::eth::ETHERTYPE_LINK_DISCOVERY;
use ofp_proto::linklayer::{Ethernet, LinkDiscovery as LinkDiscoveryPayload, Payload};
use ofp_proto::packet::PacketOut;
use ofp_proto::port::special;
use ofp_proto::{Message, MessageBody};
use tokio::time::interval;

/// Interval between successive discovery announcements on a given switch.
const ANNOUNCE_INTERVAL: Duration = Duration::from_secs(5);

/// Subscribes to `connection-up` and `packet-in`.
///
/// On `connection-up` it spawns a per-switch task that periodically floods a
/// broadcast frame carrying a discovery payload out every known port. On
/// `packet-in` it recognises that payload coming back from a neighbour,
/// computes the round trip against the embedded emission timestamp, and
/// records the link on the originating switch's record.
pub struct LinkDiscovery {
    registry: Arc<Registry>,
}

impl LinkDiscovery {
    /// Build a link-discovery application that looks switches up through `registry`.
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }
}

fn now_ns() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos() as u64).unwrap_or(0)
}

#[async_trait]
impl Application for LinkDiscovery {
    async fn on_connection_up(&self, dpid: u64) {
        let registry = Arc::clone(&self.registry);
        tokio::spawn(async move {
            let mut ticker = interval(ANNOUNCE_INTERVAL);
            loop {
                ticker.tick().await;
                let Some(switch) = registry.get(dpid).await else {
                    return;
                };
                let src_dpid = dpid.to_be_bytes();
                for port in switch.ports().await {
                    if port.port_no > special::MAX {
                        continue;
                    }
                    let frame = Ethernet::broadcast(
                        port.hw_addr,
                        ETHERTYPE_LINK_DISCOVERY,
                        Payload::LinkDiscovery(LinkDiscoveryPayload { src_dpid, timestamp_ns: now_ns() }),
                    );
                    let packet_out = PacketOut {
                        buffer_id: 0xFFFF_FFFF,
                        in_port: special::NONE,
                        actions: vec![Action::Output { port: port.port_no, max_len: 0 }],
                        data: frame.marshal(),
                    };
                    if switch.send(Message::new(0, MessageBody::PacketOut(packet_out))).await.is_err() {
                        return;
                    }
                }
            }
        });
    }

    async fn on_packet_in(&self, dpid: u64, msg: &Message) {
        let MessageBody::PacketIn(packet_in) = &msg.body else {
            return;
        };
        let Ok(ethernet) = packet_in.ethernet() else {
            return;
        };
        let Payload::LinkDiscovery(disco) = &ethernet.payload else {
            return;
        };
        let peer_dpid = u64::from_be_bytes(disco.src_dpid);
        if peer_dpid == dpid {
            return;
        }
        let Some(switch) = self.registry.get(dpid).await else {
            return;
        };
        let rtt = Duration::from_nanos(now_ns().saturating_sub(disco.timestamp_ns));
        switch.record_link(Link { peer_dpid, local_port: packet_in.in_port, rtt, bandwidth_bps: None }).await;
        tracing::debug!(
            dpid = format!("{dpid:016x}"),
            peer = format!("{peer_dpid:016x}"),
            rtt_us = rtt.as_micros() as u64,
            "link discovered"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ofp_core::SwitchRecord;
    use ofp_proto::linklayer::eth::ETHERTYPE_IPV4;
    use ofp_proto::packet::PacketIn;

    use super::*;

    fn sample_frame(src_dpid: [u8; 8], timestamp_ns: u64) -> Vec<u8> {
        Ethernet::broadcast(
            [0x02, 0, 0, 0, 0, 1],
            ETHERTYPE_LINK_DISCOVERY,
            Payload::LinkDiscovery(LinkDiscoveryPayload { src_dpid, timestamp_ns }),
        )
        .marshal()
    }

    #[tokio::test]
    async fn packet_in_from_a_neighbour_records_a_link() {
        let registry = Arc::new(Registry::new());
        registry.get_or_insert_with(1, || Arc::new(SwitchRecord::new(1, vec![]))).await;
        let app = LinkDiscovery::new(Arc::clone(&registry));

        let frame = sample_frame(2u64.to_be_bytes(), now_ns());
        let packet_in = PacketIn { buffer_id: 0xFFFF_FFFF, total_len: frame.len() as u16, in_port: 3, reason: 0, data: frame };
        app.on_packet_in(1, &Message::new(0, MessageBody::PacketIn(packet_in))).await;

        let switch = registry.get(1).await.unwrap();
        let links = switch.links().await;
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].peer_dpid, 2);
        assert_eq!(links[0].local_port, 3);
    }

    #[tokio::test]
    async fn an_announcement_looping_back_to_its_own_switch_is_ignored() {
        let registry = Arc::new(Registry::new());
        registry.get_or_insert_with(1, || Arc::new(SwitchRecord::new(1, vec![]))).await;
        let app = LinkDiscovery::new(Arc::clone(&registry));

        let frame = sample_frame(1u64.to_be_bytes(), now_ns());
        let packet_in = PacketIn { buffer_id: 0xFFFF_FFFF, total_len: frame.len() as u16, in_port: 1, reason: 0, data: frame };
        app.on_packet_in(1, &Message::new(0, MessageBody::PacketIn(packet_in))).await;

        let switch = registry.get(1).await.unwrap();
        assert!(switch.links().await.is_empty());
    }

    #[tokio::test]
    async fn a_non_discovery_packet_in_is_ignored() {
        let registry = Arc::new(Registry::new());
        registry.get_or_insert_with(1, || Arc::new(SwitchRecord::new(1, vec![]))).await;
        let app = LinkDiscovery::new(Arc::clone(&registry));

        let frame = Ethernet::broadcast([0; 6], ETHERTYPE_IPV4, Payload::Opaque(vec![1, 2, 3])).marshal();
        let packet_in = PacketIn { buffer_id: 0xFFFF_FFFF, total_len: frame.len() as u16, in_port: 1, reason: 0, data: frame };
        app.on_packet_in(1, &Message::new(0, MessageBody::PacketIn(packet_in))).await;

        let switch = registry.get(1).await.unwrap();
        assert!(switch.links().await.is_empty());
    }
}
