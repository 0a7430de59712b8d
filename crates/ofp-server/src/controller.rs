//! The listener and per-connection handshake/dispatch state machine (§4.3).

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use ofp_app::ApplicationFactory;
use ofp_core::{Application, MessageStream, Registry, SwitchRecord, PENDING_REPLY_TIMEOUT};
use ofp_proto::header::XidGenerator;
use ofp_proto::port_status::reason as port_status_reason;
use ofp_proto::{Message, MessageBody};
use tokio::net::{TcpListener, TcpStream};

use crate::error::ServerError;

/// No inbound progress for this long during the handshake fails the connection (§5).
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(3);

/// Per-subscriber fan-out hook timeout; a slow subscriber loses the message (§5).
const FAN_OUT_TIMEOUT: Duration = Duration::from_millis(100);

/// Accepts switch connections, drives each through the handshake, registers
/// the resulting switch, and fans subsequent messages out to applications.
///
/// Construct one, [`Controller::register`] every application factory, then
/// hand it to [`Controller::listen`]. The controller is cheap to clone via
/// `Arc` and is designed to be shared across the listener loop and every
/// spawned per-connection task.
pub struct Controller {
    registry: Arc<Registry>,
    factories: Vec<ApplicationFactory>,
    xid: XidGenerator,
}

impl Controller {
    /// Build a controller with no registered applications.
    pub fn new() -> Self {
        Self { registry: Arc::new(Registry::new()), factories: Vec::new(), xid: XidGenerator::new() }
    }

    /// Register a factory invoked once per successful handshake (§4.4).
    pub fn register(&mut self, factory: ApplicationFactory) {
        self.factories.push(factory);
    }

    /// The network registry backing this controller, for applications and tests
    /// that need to look switches up independently of a hook invocation.
    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.registry)
    }

    /// Bind `addr` and accept connections until the listener itself fails.
    pub async fn listen(self: Arc<Self>, addr: SocketAddr) -> Result<(), ServerError> {
        let listener = TcpListener::bind(addr).await.map_err(|e| ServerError::Listen(e.to_string()))?;
        tracing::info!(%addr, "controller listening");
        loop {
            let (socket, peer) = listener.accept().await.map_err(|e| ServerError::Listen(e.to_string()))?;
            let controller = Arc::clone(&self);
            tokio::spawn(async move {
                if let Err(e) = controller.handle_connection(socket).await {
                    tracing::info!(%peer, error = %e, "connection closed");
                }
            });
        }
    }

    async fn handle_connection(&self, socket: TcpStream) -> Result<(), ServerError> {
        let stream = MessageStream::open(socket);
        stream.send(Message::new(self.xid.next(), MessageBody::Hello)).await?;

        match recv_with_timeout(&stream).await? {
            MessageBody::Hello => {},
            MessageBody::Error(e) => {
                stream.close();
                return Err(ServerError::Handshake(format!("peer sent error during hello: {e:?}")));
            },
            other => {
                stream.close();
                return Err(ServerError::Handshake(format!("expected hello, got {:?}", other.msg_type())));
            },
        }
        stream.set_version(ofp_proto::header::VERSION_1_0);

        stream.send(Message::new(self.xid.next(), MessageBody::FeaturesRequest)).await?;
        let features = match recv_with_timeout(&stream).await? {
            MessageBody::FeaturesReply(f) => f,
            MessageBody::Error(e) => {
                stream.close();
                return Err(ServerError::Handshake(format!("peer sent error during features exchange: {e:?}")));
            },
            other => {
                stream.close();
                return Err(ServerError::Handshake(format!("expected features_reply, got {:?}", other.msg_type())));
            },
        };

        let dpid = features.datapath_id;
        let switch = self.register_switch(dpid, features.ports.clone(), Arc::clone(&stream)).await;

        for factory in &self.factories {
            let app = factory();
            switch.attach_app(Arc::clone(&app)).await;
            app.on_connection_up(dpid).await;
        }

        tracing::info!(dpid = format!("{dpid:016x}"), "switch handshake complete");
        self.run_switch_loop(dpid, switch, stream).await;
        Ok(())
    }

    /// Create or rebind the switch record for `dpid` (§4.3's switch registration).
    async fn register_switch(&self, dpid: u64, ports: Vec<ofp_proto::port::PhyPort>, stream: Arc<MessageStream>) -> Arc<SwitchRecord> {
        let (switch, fresh) =
            self.registry.get_or_insert_with(dpid, || Arc::new(SwitchRecord::new(dpid, ports.clone()))).await;
        if !fresh {
            switch.set_ports(ports).await;
        }
        switch.bind_stream(stream).await;
        switch
    }

    /// Consume inbound messages for one switch until the stream errors or closes.
    async fn run_switch_loop(&self, dpid: u64, switch: Arc<SwitchRecord>, stream: Arc<MessageStream>) {
        loop {
            tokio::select! {
                msg = stream.recv() => {
                    match msg {
                        Some(msg) => self.dispatch(dpid, &switch, msg).await,
                        None => break,
                    }
                },
                err = stream.recv_error() => {
                    tracing::info!(dpid = format!("{dpid:016x}"), error = %err, "switch connection lost");
                    break;
                },
            }
        }

        switch.clear_stream().await;
        for app in switch.apps().await {
            app.on_connection_down(dpid).await;
        }
        for (xid, sink) in switch.drain_pending().await {
            tracing::debug!(dpid = format!("{dpid:016x}"), xid, "dropping pending request on disconnect");
            drop(sink);
        }
    }

    /// Route one inbound message: pending-reply delivery if its xid matches,
    /// otherwise fan-out to every attached application instance (§4.3).
    async fn dispatch(&self, dpid: u64, switch: &Arc<SwitchRecord>, msg: Message) {
        if let Some(sink) = switch.take_pending(msg.xid).await {
            if tokio::time::timeout(PENDING_REPLY_TIMEOUT, sink.send(msg)).await.is_err() {
                tracing::debug!(dpid = format!("{dpid:016x}"), "pending-request delivery timed out, reply dropped");
            }
            return;
        }

        if let MessageBody::PortStatus(status) = &msg.body {
            match status.reason {
                port_status_reason::DELETE => switch.remove_port(status.desc.port_no).await,
                _ => switch.upsert_port(status.desc.clone()).await,
            }
        }

        for app in switch.apps().await {
            let app = Arc::clone(&app);
            let msg = msg.clone();
            if tokio::time::timeout(FAN_OUT_TIMEOUT, dispatch_to(app, dpid, msg)).await.is_err() {
                tracing::warn!(dpid = format!("{dpid:016x}"), "application hook timed out, message dropped for this subscriber");
            }
        }
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

async fn recv_with_timeout(stream: &Arc<MessageStream>) -> Result<MessageBody, ServerError> {
    tokio::select! {
        result = tokio::time::timeout(HANDSHAKE_TIMEOUT, stream.recv()) => {
            match result {
                Ok(Some(msg)) => Ok(msg.body),
                Ok(None) => {
                    stream.close();
                    Err(ServerError::Handshake("stream closed during handshake".into()))
                },
                Err(_) => {
                    stream.close();
                    Err(ServerError::HandshakeTimeout)
                },
            }
        },
        err = stream.recv_error() => {
            stream.close();
            Err(ServerError::Stream(err))
        },
    }
}

/// Invoke the capability hook matching `msg`'s variant (§4.3's fan-out table).
async fn dispatch_to(app: Arc<dyn Application>, dpid: u64, msg: Message) {
    match &msg.body {
        MessageBody::Hello => app.on_hello(dpid, &msg).await,
        MessageBody::Error(_) => app.on_error(dpid, &msg).await,
        MessageBody::EchoRequest(_) => app.on_echo_request(dpid, &msg).await,
        MessageBody::EchoReply(_) => app.on_echo_reply(dpid, &msg).await,
        MessageBody::Vendor(_) => app.on_vendor(dpid, &msg).await,
        MessageBody::FeaturesRequest => app.on_features_request(dpid, &msg).await,
        MessageBody::FeaturesReply(_) => app.on_features_reply(dpid, &msg).await,
        MessageBody::GetConfigRequest => {},
        MessageBody::GetConfigReply(_) => app.on_get_config_reply(dpid, &msg).await,
        MessageBody::SetConfig(_) => app.on_set_config(dpid, &msg).await,
        MessageBody::PacketIn(_) => app.on_packet_in(dpid, &msg).await,
        MessageBody::FlowRemoved(_) => app.on_flow_removed(dpid, &msg).await,
        MessageBody::PortStatus(_) => app.on_port_status(dpid, &msg).await,
        MessageBody::PacketOut(_) => app.on_packet_out(dpid, &msg).await,
        MessageBody::FlowMod(_) => app.on_flow_mod(dpid, &msg).await,
        MessageBody::PortMod(_) => app.on_port_mod(dpid, &msg).await,
        MessageBody::StatsRequest { .. } => app.on_stats_request(dpid, &msg).await,
        MessageBody::StatsReply { .. } => app.on_stats_reply(dpid, &msg).await,
        MessageBody::BarrierRequest => app.on_barrier_request(dpid, &msg).await,
        MessageBody::BarrierReply => app.on_barrier_reply(dpid, &msg).await,
        MessageBody::QueueGetConfigRequest { .. } | MessageBody::QueueGetConfigReply { .. } => {},
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use ofp_proto::features::FeaturesReply;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpStream;
    use tokio::sync::Mutex;

    use super::*;

    struct RecordingApp {
        connections_up: Arc<Mutex<Vec<u64>>>,
        packets_in: Arc<Mutex<u32>>,
    }

    #[async_trait]
    impl Application for RecordingApp {
        async fn on_connection_up(&self, dpid: u64) {
            self.connections_up.lock().await.push(dpid);
        }

        async fn on_packet_in(&self, _dpid: u64, _msg: &Message) {
            *self.packets_in.lock().await += 1;
        }
    }

    async fn handshake_over(client: &mut TcpStream) -> u64 {
        let dpid = 0x0102_0304_0506_0708u64;
        // hello
        recv_one(client).await;
        client.write_all(&Message::new(1, MessageBody::Hello).encode()).await.unwrap();
        // features_request
        recv_one(client).await;
        let reply = FeaturesReply { datapath_id: dpid, n_buffers: 0, n_tables: 1, capabilities: 0, actions: 0, ports: vec![] };
        client.write_all(&Message::new(1, MessageBody::FeaturesReply(reply)).encode()).await.unwrap();
        dpid
    }

    async fn recv_one(client: &mut TcpStream) {
        use tokio::io::AsyncReadExt;
        let mut header = [0u8; 8];
        client.read_exact(&mut header).await.unwrap();
        let len = u16::from_be_bytes([header[2], header[3]]) as usize;
        let mut rest = vec![0u8; len - 8];
        if !rest.is_empty() {
            client.read_exact(&mut rest).await.unwrap();
        }
    }

    #[tokio::test]
    async fn a_completed_handshake_registers_exactly_one_switch_and_invokes_connection_up() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let connections_up = Arc::new(Mutex::new(Vec::new()));
        let packets_in = Arc::new(Mutex::new(0));
        let mut controller = Controller::new();
        let recording = Arc::new(RecordingApp { connections_up: Arc::clone(&connections_up), packets_in: Arc::clone(&packets_in) });
        controller.register(Arc::new(move || Arc::clone(&recording) as Arc<dyn Application>));
        let controller = Arc::new(controller);
        let registry = controller.registry();

        let accept_controller = Arc::clone(&controller);
        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            accept_controller.handle_connection(socket).await.ok();
        });

        let mut client = TcpStream::connect(addr).await.unwrap();
        let dpid = handshake_over(&mut client).await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(registry.len().await, 1);
        assert_eq!(connections_up.lock().await.as_slice(), &[dpid]);
    }

    #[tokio::test]
    async fn silence_during_handshake_times_out_without_registering_a_switch() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let controller = Arc::new(Controller::new());
        let registry = controller.registry();
        let accept_controller = Arc::clone(&controller);
        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let _ = accept_controller.handle_connection(socket).await;
        });

        let _client = TcpStream::connect(addr).await.unwrap();
        tokio::time::sleep(HANDSHAKE_TIMEOUT + Duration::from_millis(200)).await;
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn reconnection_with_the_same_dpid_rebinds_rather_than_duplicating() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let mut controller = Controller::new();
        controller.register(Arc::new(|| {
            Arc::new(RecordingApp { connections_up: Arc::new(Mutex::new(Vec::new())), packets_in: Arc::new(Mutex::new(0)) })
                as Arc<dyn Application>
        }));
        let controller = Arc::new(controller);
        let registry = controller.registry();

        for _ in 0..2 {
            let accept_controller = Arc::clone(&controller);
            let mut client = TcpStream::connect(addr).await.unwrap();
            let (socket, _) = listener.accept().await.unwrap();
            tokio::spawn(async move { accept_controller.handle_connection(socket).await.ok() });
            handshake_over(&mut client).await;
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn a_packet_in_after_handshake_reaches_every_attached_application_once() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let packets_in_a = Arc::new(Mutex::new(0));
        let packets_in_b = Arc::new(Mutex::new(0));
        let mut controller = Controller::new();
        let a = Arc::new(RecordingApp { connections_up: Arc::new(Mutex::new(Vec::new())), packets_in: Arc::clone(&packets_in_a) });
        let b = Arc::new(RecordingApp { connections_up: Arc::new(Mutex::new(Vec::new())), packets_in: Arc::clone(&packets_in_b) });
        controller.register(Arc::new(move || Arc::clone(&a) as Arc<dyn Application>));
        controller.register(Arc::new(move || Arc::clone(&b) as Arc<dyn Application>));
        let controller = Arc::new(controller);

        let accept_controller = Arc::clone(&controller);
        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            accept_controller.handle_connection(socket).await.ok();
        });

        let mut client = TcpStream::connect(addr).await.unwrap();
        handshake_over(&mut client).await;

        let packet_in = ofp_proto::packet::PacketIn {
            buffer_id: 0xFFFF_FFFF,
            total_len: 4,
            in_port: 1,
            reason: ofp_proto::packet::reason::NO_MATCH,
            data: vec![1, 2, 3, 4],
        };
        client.write_all(&Message::new(2, MessageBody::PacketIn(packet_in)).encode()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(*packets_in_a.lock().await, 1);
        assert_eq!(*packets_in_b.lock().await, 1);
    }
}
