//! The controller runtime: listener, handshake state machine, switch
//! registration and message fan-out, built on the transport primitives in
//! `ofp-core` and the application contract in `ofp-app`.

pub mod config;
pub mod controller;
pub mod error;

pub use config::Args;
pub use controller::Controller;
pub use error::ServerError;
