//! Per-connection switch state: the owning stream, attached applications,
//! port and link maps, and outstanding request bookkeeping (§3).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use ofp_proto::port::PhyPort;
use ofp_proto::Message;
use tokio::sync::{mpsc, RwLock};

use crate::app::Application;
use crate::stream::MessageStream;

/// A link discovered to a neighbouring switch, as recorded by the
/// link-discovery application (§3, §4.5). The controller core never
/// populates this map itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    /// Datapath id of the neighbouring switch.
    pub peer_dpid: u64,
    /// Local port the link was observed on.
    pub local_port: u16,
    /// Measured round-trip duration of the discovery announcement.
    pub rtt: Duration,
    /// Measured or advertised link bandwidth, if known.
    pub bandwidth_bps: Option<u64>,
}

/// Single-capacity sink a pending request's reply is delivered to.
///
/// Backed by a bounded `mpsc` channel of capacity 1 rather than a `oneshot`
/// so that delivery can be attempted with a timeout (§5's 100 ms pending-request
/// delivery timeout) without consuming the sender on failure.
pub type ResponseSink = mpsc::Sender<Message>;

/// Delivery timeout for a reply matched against a pending request (§5).
pub const PENDING_REPLY_TIMEOUT: Duration = Duration::from_millis(100);

/// All per-datapath state accumulated across the lifetime of a connection,
/// and preserved (port/link maps, pending requests drained) across a reconnect.
pub struct SwitchRecord {
    /// 48-bit datapath id this record is keyed under.
    pub datapath_id: u64,
    stream: RwLock<Option<Arc<MessageStream>>>,
    apps: RwLock<Vec<Arc<dyn Application>>>,
    ports: RwLock<HashMap<u16, PhyPort>>,
    links: RwLock<HashMap<u64, Link>>,
    pending: RwLock<HashMap<u32, ResponseSink>>,
}

impl SwitchRecord {
    /// Build a fresh record for `datapath_id`, seeded with the ports reported
    /// in the features reply that completed the handshake.
    pub fn new(datapath_id: u64, ports: Vec<PhyPort>) -> Self {
        Self {
            datapath_id,
            stream: RwLock::new(None),
            apps: RwLock::new(Vec::new()),
            ports: RwLock::new(ports.into_iter().map(|p| (p.port_no, p)).collect()),
            links: RwLock::new(HashMap::new()),
            pending: RwLock::new(HashMap::new()),
        }
    }

    /// Bind (or rebind, on reconnection) the owning message stream.
    pub async fn bind_stream(&self, stream: Arc<MessageStream>) {
        *self.stream.write().await = Some(stream);
    }

    /// Clear the owning stream, e.g. after the stream surfaced an error.
    pub async fn clear_stream(&self) {
        *self.stream.write().await = None;
    }

    /// Overwrite the port map with the set of ports from a fresh features reply.
    pub async fn set_ports(&self, ports: Vec<PhyPort>) {
        *self.ports.write().await = ports.into_iter().map(|p| (p.port_no, p)).collect();
    }

    /// Snapshot of the current port map.
    pub async fn ports(&self) -> Vec<PhyPort> {
        self.ports.read().await.values().cloned().collect()
    }

    /// A single port by number, if known.
    pub async fn port(&self, port_no: u16) -> Option<PhyPort> {
        self.ports.read().await.get(&port_no).cloned()
    }

    /// Insert or update a single port's descriptor (e.g. from a `port_status`).
    pub async fn upsert_port(&self, port: PhyPort) {
        self.ports.write().await.insert(port.port_no, port);
    }

    /// Remove a port by number (e.g. a `port_status` delete notification).
    pub async fn remove_port(&self, port_no: u16) {
        self.ports.write().await.remove(&port_no);
    }

    /// Append an application instance to this switch's instance list.
    /// Append-only: instances are never removed for the lifetime of the record.
    pub async fn attach_app(&self, app: Arc<dyn Application>) {
        self.apps.write().await.push(app);
    }

    /// Snapshot of the currently attached application instances.
    pub async fn apps(&self) -> Vec<Arc<dyn Application>> {
        self.apps.read().await.clone()
    }

    /// Record a discovered link to a neighbouring switch.
    pub async fn record_link(&self, link: Link) {
        self.links.write().await.insert(link.peer_dpid, link);
    }

    /// Snapshot of currently known links.
    pub async fn links(&self) -> Vec<Link> {
        self.links.read().await.values().copied().collect()
    }

    /// Register a response sink for an outstanding request's transaction id.
    pub async fn register_pending(&self, xid: u32, sink: ResponseSink) {
        self.pending.write().await.insert(xid, sink);
    }

    /// Remove and return the response sink for `xid`, if one is registered.
    /// Removal happens before delivery is attempted, per the dispatch invariant
    /// that the entry is gone before the next message is processed.
    pub async fn take_pending(&self, xid: u32) -> Option<ResponseSink> {
        self.pending.write().await.remove(&xid)
    }

    /// Drain every outstanding pending-request sink, dropping each one so
    /// that any caller awaiting a reply observes the channel close rather
    /// than hanging forever (§9's resolved pending-request-lifecycle question).
    pub async fn drain_pending(&self) -> Vec<(u32, ResponseSink)> {
        self.pending.write().await.drain().collect()
    }

    /// Enqueue `msg` on the owning stream, if one is currently bound.
    pub async fn send(&self, msg: Message) -> crate::error::Result<()> {
        match self.stream.read().await.as_ref() {
            Some(stream) => stream.send(msg).await,
            None => Err(crate::error::StreamError::Closed),
        }
    }

    /// The currently bound stream, if any.
    pub async fn stream(&self) -> Option<Arc<MessageStream>> {
        self.stream.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use ofp_proto::MessageBody;

    use super::*;

    #[tokio::test]
    async fn new_record_seeds_port_map_from_features_reply_ports() {
        let port = PhyPort {
            port_no: 1,
            hw_addr: [0; 6],
            name: [0u8; 16],
            config: 0,
            state: 0,
            curr: 0,
            advertised: 0,
            supported: 0,
            peer: 0,
        };
        let record = SwitchRecord::new(1, vec![port.clone()]);
        assert_eq!(record.ports().await, vec![port]);
    }

    #[tokio::test]
    async fn pending_entry_is_removed_once_taken() {
        let record = SwitchRecord::new(1, vec![]);
        let (tx, _rx) = mpsc::channel(1);
        record.register_pending(5, tx).await;
        assert!(record.take_pending(5).await.is_some());
        assert!(record.take_pending(5).await.is_none());
    }

    #[tokio::test]
    async fn send_without_a_bound_stream_fails_closed() {
        let record = SwitchRecord::new(1, vec![]);
        let result = record.send(Message::new(1, MessageBody::Hello)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn drain_pending_empties_the_map_and_yields_every_entry() {
        let record = SwitchRecord::new(1, vec![]);
        let (tx1, _rx1) = mpsc::channel(1);
        let (tx2, _rx2) = mpsc::channel(1);
        record.register_pending(1, tx1).await;
        record.register_pending(2, tx2).await;

        let drained = record.drain_pending().await;
        assert_eq!(drained.len(), 2);
        assert!(record.take_pending(1).await.is_none());
        assert!(record.take_pending(2).await.is_none());
    }

    #[tokio::test]
    async fn attach_app_is_append_only_and_preserved_across_rebind() {
        use async_trait::async_trait;

        struct Noop;
        #[async_trait]
        impl Application for Noop {}

        let record = SwitchRecord::new(1, vec![]);
        record.attach_app(Arc::new(Noop)).await;
        record.attach_app(Arc::new(Noop)).await;
        assert_eq!(record.apps().await.len(), 2);
    }
}
