//! Per-connection message stream, switch record, and network registry.
//!
//! This crate has no notion of the OpenFlow handshake or application
//! dispatch — that belongs to `ofp-server`, which builds on top of the
//! primitives here. What lives here is everything a connection needs
//! regardless of what protocol state machine drives it: framed transport
//! ([`stream::MessageStream`]), per-switch bookkeeping ([`switch::SwitchRecord`]),
//! process-wide switch lookup ([`registry::Registry`]), and the capability-hook
//! contract application instances implement ([`app::Application`]).

pub mod app;
pub mod buffer_pool;
pub mod error;
pub mod registry;
pub mod stream;
pub mod switch;

pub use app::Application;
pub use error::{Result, StreamError};
pub use registry::Registry;
pub use stream::MessageStream;
pub use switch::{Link, ResponseSink, SwitchRecord, PENDING_REPLY_TIMEOUT};
