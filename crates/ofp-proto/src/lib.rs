//! OpenFlow 1.0 wire codec: headers, matches, actions, and the full v1.0
//! message set, plus the subset of link-layer formats needed to interpret
//! `packet_in` payloads.
//!
//! Every type in this crate is a pure value with `marshal`/`unmarshal`
//! methods; none of it touches a socket. [`message::Message`] is the
//! top-level entry point: a tagged sum over every v1.0 message type,
//! decided once at decode time.

pub mod action;
pub mod config;
pub mod error;
pub mod error_msg;
pub mod features;
pub mod flow;
pub mod header;
pub mod linklayer;
pub mod match_;
pub mod message;
pub mod packet;
pub mod port;
pub mod port_mod;
pub mod port_status;
pub mod stats;
pub mod vendor;

pub use error::{CodecError, Result};
pub use header::{Header, MessageType, XidGenerator, HEADER_LEN, VERSION_1_0};
pub use message::{Message, MessageBody};
