//! The bounded "empty"/"full" buffer pool shared by a connection's reader and parser stages.
//!
//! Ownership of a buffer transfers atomically from "empty" to the reader, from
//! the reader to "full", from "full" to a parser, and back to "empty"; no
//! buffer is ever aliased across stages. The pool's total buffer count is
//! fixed for the lifetime of a connection.

use std::sync::Arc;

use bytes::BytesMut;
use tokio::sync::{mpsc, Mutex};

/// Number of buffers in each of the "empty" and "full" queues.
pub const POOL_CAPACITY: usize = 50;

/// Per-buffer capacity. The data model calls for "≥2048 bytes"; this is sized
/// to the protocol's maximum message length (a `u16` length field) so that no
/// single OpenFlow message ever overflows the buffer it was framed into.
pub const BUFFER_CAPACITY: usize = u16::MAX as usize;

/// The reader's exclusive handle onto the pool: draws fresh buffers, returns filled ones.
pub struct ReaderSide {
    pub(crate) empty_rx: mpsc::Receiver<BytesMut>,
    pub(crate) full_tx: mpsc::Sender<BytesMut>,
}

/// A parser worker's shared handle onto the pool: draws filled buffers, returns drained ones.
///
/// `full_rx` is shared across the whole parser pool behind a mutex rather than
/// given one receiver each, since `tokio::sync::mpsc` has a single-consumer
/// receiver; workers simply take turns under the lock while awaiting the next item.
#[derive(Clone)]
pub struct ParserSide {
    pub(crate) full_rx: Arc<Mutex<mpsc::Receiver<BytesMut>>>,
    pub(crate) empty_tx: mpsc::Sender<BytesMut>,
}

/// Build a pool pre-populated with [`POOL_CAPACITY`] buffers of [`BUFFER_CAPACITY`] bytes.
pub fn build() -> (ReaderSide, ParserSide) {
    let (empty_tx, empty_rx) = mpsc::channel(POOL_CAPACITY);
    let (full_tx, full_rx) = mpsc::channel(POOL_CAPACITY);
    for _ in 0..POOL_CAPACITY {
        #[allow(clippy::expect_used, reason = "channel capacity is POOL_CAPACITY and this loop sends exactly that many")]
        empty_tx
            .try_send(BytesMut::with_capacity(BUFFER_CAPACITY))
            .expect("channel sized to exactly POOL_CAPACITY buffers");
    }
    (ReaderSide { empty_rx, full_tx }, ParserSide { full_rx: Arc::new(Mutex::new(full_rx)), empty_tx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pool_starts_with_exactly_pool_capacity_empty_buffers() {
        let (mut reader, _parser) = build();
        for _ in 0..POOL_CAPACITY {
            assert!(reader.empty_rx.try_recv().is_ok());
        }
        assert!(reader.empty_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn a_buffer_returned_to_empty_can_be_drawn_again() {
        let (mut reader, parser) = build();
        let buf = reader.empty_rx.recv().await.unwrap();
        parser.empty_tx.send(buf).await.unwrap();
        assert!(reader.empty_rx.recv().await.is_some());
    }
}
