//! The per-connection message stream: framed full-duplex transport over a
//! TCP socket, with a bounded buffer-pool, a length-prefix reassembler, a
//! parser stage, and a writer stage, cooperating under a shutdown and error
//! discipline (§4.2).

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use bytes::BytesMut;
use ofp_proto::header::VERSION_1_0;
use ofp_proto::Message;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch, Mutex as AsyncMutex, Notify};

use crate::buffer_pool::{self, ParserSide, ReaderSide};
use crate::error::StreamError;

/// Number of concurrent parser workers per connection (§5).
pub const PARSER_POOL_SIZE: usize = 25;

/// Bound on the inbound/outbound application-facing queues.
///
/// Unlike the buffer pool, the data model does not fix this size; it is
/// chosen generously enough that a burst of traffic does not itself become a
/// back-pressure source ahead of the buffer pool.
const QUEUE_CAPACITY: usize = 256;

/// Scratch buffer the reader performs each individual socket read into.
const SCRATCH_LEN: usize = 2048;

/// A single-shot, multi-waiter shutdown signal.
#[derive(Clone)]
struct ShutdownLatch {
    notify: Arc<Notify>,
    triggered: Arc<std::sync::atomic::AtomicBool>,
}

impl ShutdownLatch {
    fn new() -> Self {
        Self { notify: Arc::new(Notify::new()), triggered: Arc::new(std::sync::atomic::AtomicBool::new(false)) }
    }

    fn trigger(&self) {
        self.triggered.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    async fn wait(&self) {
        if self.is_triggered() {
            return;
        }
        self.notify.notified().await;
    }
}

/// Tracks how much of the current buffer's header and body have been filled.
///
/// Mirrors §4.2's reader: it watches only the first 4 octets to learn the
/// declared length, then fills the remaining `length - 4` octets verbatim
/// (those 4 octets include the rest of the 8-byte header, which the parser
/// stage interprets later).
enum Phase {
    Header { filled: usize, octets: [u8; 4] },
    Body { needed: usize, filled: usize },
}

struct Assembler {
    phase: Phase,
}

impl Assembler {
    fn new() -> Self {
        Self { phase: Phase::Header { filled: 0, octets: [0u8; 4] } }
    }

    /// Feed as much of `data` as fits into the current phase, appending
    /// consumed bytes to `buf`. Returns `(bytes_consumed, message_complete)`.
    fn feed(&mut self, buf: &mut BytesMut, data: &[u8]) -> std::result::Result<(usize, bool), StreamError> {
        match &mut self.phase {
            Phase::Header { filled, octets } => {
                let need = 4 - *filled;
                let take = need.min(data.len());
                octets[*filled..*filled + take].copy_from_slice(&data[..take]);
                buf.extend_from_slice(&data[..take]);
                *filled += take;
                if *filled == 4 {
                    let length = u16::from_be_bytes([octets[2], octets[3]]) as usize;
                    if length < 4 {
                        return Err(StreamError::Framing(format!(
                            "declared message length {length} shorter than the 4 octets already read"
                        )));
                    }
                    let needed = length - 4;
                    let complete = needed == 0;
                    self.phase = Phase::Body { needed, filled: 0 };
                    return Ok((take, complete));
                }
                Ok((take, false))
            },
            Phase::Body { needed, filled } => {
                let need = *needed - *filled;
                let take = need.min(data.len());
                buf.extend_from_slice(&data[..take]);
                *filled += take;
                Ok((take, *filled == *needed))
            },
        }
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}

async fn reader_task(
    mut read_half: tokio::net::tcp::OwnedReadHalf,
    mut side: ReaderSide,
    error_tx: watch::Sender<Option<StreamError>>,
    shutdown: ShutdownLatch,
) {
    let mut scratch = [0u8; SCRATCH_LEN];
    let mut current = match side.empty_rx.recv().await {
        Some(buf) => buf,
        None => return,
    };
    let mut assembler = Assembler::new();

    loop {
        let read_result = tokio::select! {
            () = shutdown.wait() => break,
            result = read_half.read(&mut scratch) => result,
        };

        let n = match read_result {
            Ok(0) => {
                publish_error(&error_tx, StreamError::Io("connection closed by peer".to_string()));
                shutdown.trigger();
                break;
            },
            Ok(n) => n,
            Err(e) => {
                publish_error(&error_tx, StreamError::Io(e.to_string()));
                shutdown.trigger();
                break;
            },
        };

        let mut offset = 0;
        while offset < n {
            let fed = assembler.feed(&mut current, &scratch[offset..n]);
            let (consumed, complete) = match fed {
                Ok(pair) => pair,
                Err(e) => {
                    publish_error(&error_tx, e);
                    shutdown.trigger();
                    return;
                },
            };
            offset += consumed;
            if complete {
                let filled = std::mem::replace(&mut current, BytesMut::new());
                if side.full_tx.send(filled).await.is_err() {
                    shutdown.trigger();
                    return;
                }
                current = match side.empty_rx.recv().await {
                    Some(buf) => buf,
                    None => {
                        shutdown.trigger();
                        return;
                    },
                };
                assembler.reset();
            }
        }
    }
}

async fn parser_task(side: ParserSide, inbound_tx: mpsc::Sender<Message>, version: Arc<AtomicU8>) {
    loop {
        let mut buf = {
            let mut full_rx = side.full_rx.lock().await;
            match full_rx.recv().await {
                Some(buf) => buf,
                None => return,
            }
        };

        if buf.first().copied() == Some(VERSION_1_0) {
            match Message::decode(&buf) {
                Ok(msg) => {
                    version.store(VERSION_1_0, Ordering::Relaxed);
                    if inbound_tx.send(msg).await.is_err() {
                        return;
                    }
                },
                Err(e) => {
                    tracing::warn!(error = %e, "dropping undecodable OpenFlow message");
                },
            }
        } else {
            tracing::warn!(version = buf.first().copied(), "dropping message with unsupported protocol version");
        }

        buf.clear();
        if side.empty_tx.send(buf).await.is_err() {
            return;
        }
    }
}

async fn writer_task(
    mut write_half: tokio::net::tcp::OwnedWriteHalf,
    mut outbound_rx: mpsc::Receiver<Message>,
    error_tx: watch::Sender<Option<StreamError>>,
    shutdown: ShutdownLatch,
) {
    loop {
        tokio::select! {
            () = shutdown.wait() => {
                let _ = write_half.shutdown().await;
                break;
            },
            msg = outbound_rx.recv() => {
                match msg {
                    Some(m) => {
                        let wire = m.encode();
                        if let Err(e) = write_half.write_all(&wire).await {
                            publish_error(&error_tx, StreamError::Io(e.to_string()));
                            shutdown.trigger();
                            break;
                        }
                    },
                    None => {
                        shutdown.trigger();
                        break;
                    },
                }
            },
        }
    }
}

fn publish_error(error_tx: &watch::Sender<Option<StreamError>>, err: StreamError) {
    // Published once per connection; later sends after the first are harmless
    // no-ops since every consumer only acts on the transition out of `None`.
    let _ = error_tx.send_if_modified(|slot| {
        if slot.is_none() {
            *slot = Some(err);
            true
        } else {
            false
        }
    });
}

/// A bidirectional channel of typed OpenFlow messages over a TCP socket.
///
/// Constructed via [`MessageStream::open`], which spawns the reader, the
/// parser pool, and the writer as independent tasks (§5's per-connection task
/// graph, minus the handshake and per-switch receive tasks, which are owned
/// by `ofp-server`).
pub struct MessageStream {
    outbound_tx: mpsc::Sender<Message>,
    inbound_rx: AsyncMutex<mpsc::Receiver<Message>>,
    error_rx: watch::Receiver<Option<StreamError>>,
    shutdown: ShutdownLatch,
    version: Arc<AtomicU8>,
}

impl MessageStream {
    /// Start the three stages over `conn` and return a handle.
    pub fn open(conn: TcpStream) -> Arc<Self> {
        let _ = conn.set_nodelay(true);
        let (read_half, write_half) = conn.into_split();
        let (reader_side, parser_side) = buffer_pool::build();

        let (inbound_tx, inbound_rx) = mpsc::channel(QUEUE_CAPACITY);
        let (outbound_tx, outbound_rx) = mpsc::channel(QUEUE_CAPACITY);
        let (error_tx, error_rx) = watch::channel(None);
        let shutdown = ShutdownLatch::new();
        let version = Arc::new(AtomicU8::new(0));

        tokio::spawn(reader_task(read_half, reader_side, error_tx.clone(), shutdown.clone()));
        for _ in 0..PARSER_POOL_SIZE {
            tokio::spawn(parser_task(parser_side.clone(), inbound_tx.clone(), Arc::clone(&version)));
        }
        tokio::spawn(writer_task(write_half, outbound_rx, error_tx.clone(), shutdown.clone()));

        Arc::new(Self {
            outbound_tx,
            inbound_rx: AsyncMutex::new(inbound_rx),
            error_rx,
            shutdown,
            version,
        })
    }

    /// Enqueue an outbound message. Delivered to the socket in FIFO order
    /// relative to every other call to `send` on this stream.
    pub async fn send(&self, msg: Message) -> crate::error::Result<()> {
        self.outbound_tx.send(msg).await.map_err(|_| StreamError::Closed)
    }

    /// Receive the next inbound message, or `None` once the stream is closed
    /// and drained. Multiple concurrent callers take turns under an internal lock.
    pub async fn recv(&self) -> Option<Message> {
        self.inbound_rx.lock().await.recv().await
    }

    /// Resolves once the stream has published an error, yielding it.
    /// Resolves immediately if an error was already published.
    pub async fn recv_error(&self) -> StreamError {
        let mut rx = self.error_rx.clone();
        loop {
            if let Some(err) = rx.borrow().clone() {
                return err;
            }
            if rx.changed().await.is_err() {
                return StreamError::Closed;
            }
        }
    }

    /// Request shutdown: the writer closes the socket, the reader observes
    /// the close on its next read, parser workers exit as buffers drain.
    pub fn close(&self) {
        self.shutdown.trigger();
    }

    /// The negotiated protocol version; `0` until a v1.0 hello succeeds.
    pub fn version(&self) -> u8 {
        self.version.load(Ordering::Relaxed)
    }

    /// Record that version negotiation succeeded. Called by the handshake
    /// state machine in `ofp-server`, not by the stream itself.
    pub fn set_version(&self, version: u8) {
        self.version.store(version, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use ofp_proto::MessageBody;
    use tokio::net::TcpListener;

    use super::*;

    async fn loopback_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).await.unwrap();
        let (server, _) = listener.accept().await.unwrap();
        (client, server)
    }

    #[tokio::test]
    async fn framing_invariant_holds_for_concatenated_messages() {
        let (client, server) = loopback_pair().await;
        let server_stream = MessageStream::open(server);
        let client_stream = MessageStream::open(client);

        let hello = Message::new(1, MessageBody::Hello);
        let barrier = Message::new(2, MessageBody::BarrierRequest);
        client_stream.send(hello.clone()).await.unwrap();
        client_stream.send(barrier.clone()).await.unwrap();

        let mut received = Vec::new();
        for _ in 0..2 {
            received.push(server_stream.recv().await.unwrap());
        }
        received.sort_by_key(|m| m.xid);
        assert_eq!(received, vec![hello, barrier]);
    }

    #[tokio::test]
    async fn split_socket_reads_still_frame_correctly() {
        let (client, server) = loopback_pair().await;
        let server_stream = MessageStream::open(server);

        let msg = Message::new(7, MessageBody::EchoRequest(vec![1, 2, 3, 4, 5, 6, 7, 8]));
        let wire = msg.encode();

        // Write the header and body in separate writes to force the
        // reassembler to resume mid-message.
        let mut client = client;
        client.write_all(&wire[..3]).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        client.write_all(&wire[3..]).await.unwrap();

        let decoded = server_stream.recv().await.unwrap();
        assert_eq!(decoded, msg);
    }

    #[tokio::test]
    async fn shutdown_surfaces_as_an_error_on_the_peer() {
        let (client, server) = loopback_pair().await;
        let client_stream = MessageStream::open(client);
        let server_stream = MessageStream::open(server);

        client_stream.close();
        let err = server_stream.recv_error().await;
        assert!(matches!(err, StreamError::Io(_)));
    }

    #[tokio::test]
    async fn version_starts_at_zero_and_updates_after_decode() {
        let (client, server) = loopback_pair().await;
        let server_stream = MessageStream::open(server);
        let client_stream = MessageStream::open(client);
        assert_eq!(server_stream.version(), 0);

        client_stream.send(Message::new(1, MessageBody::Hello)).await.unwrap();
        server_stream.recv().await.unwrap();
        assert_eq!(server_stream.version(), VERSION_1_0);
    }
}
