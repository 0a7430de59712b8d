//! The application contract consumed by the controller, plus two worked
//! applications that exercise it end to end (§4.4, §4.5).
//!
//! The [`Application`] trait itself is defined in `ofp-core` (see that
//! crate's module docs for why); this crate re-exports it alongside the
//! zero-argument factory type the controller uses to produce one instance
//! per connected switch, and ships the echo responder and link-discovery
//! loop as concrete, testable consumers of that contract.

pub mod echo;
pub mod factory;
pub mod link_discovery;

pub use echo::EchoResponder;
pub use factory::ApplicationFactory;
pub use link_discovery::LinkDiscovery;
pub use ofp_core::Application;
