//! The capability-hook contract implemented by application instances.
//!
//! This lives in `ofp-core` rather than `ofp-app` because [`crate::switch::SwitchRecord`]
//! holds application instances directly (§3's "append-only list of application
//! instances"); `ofp-app` depends on `ofp-core`, so the trait those instances
//! implement cannot live on the other side of that edge. `ofp-app` re-exports
//! this trait alongside its two worked implementations, which is where a
//! third party registering a new application should look first.
//!
//! Every hook has a no-op default body, so an instance "need not implement
//! any particular capability" (§4.4): the dispatcher in `ofp-server` calls
//! every hook unconditionally, and only the hooks an implementation actually
//! overrides do anything. This replaces the reference implementation's
//! runtime type-reflection probing with ordinary static dispatch over a
//! vtable, per §9's capability-detection design note.

use async_trait::async_trait;
use ofp_proto::Message;

/// A pluggable consumer of switch events, attached once per connected datapath.
///
/// Implementations must not retain a borrowed [`Message`] past the hook call
/// that handed it to them; clone out anything that needs to outlive it.
#[async_trait]
pub trait Application: Send + Sync {
    /// A switch completed the handshake and was registered (or reconnected).
    async fn on_connection_up(&self, _dpid: u64) {}

    /// The switch's stream was torn down; any pending replies have been drained.
    async fn on_connection_down(&self, _dpid: u64) {}

    /// `OFPT_HELLO` arrived after the handshake (unusual, but not forbidden).
    async fn on_hello(&self, _dpid: u64, _msg: &Message) {}

    /// `OFPT_ERROR` arrived from the switch.
    async fn on_error(&self, _dpid: u64, _msg: &Message) {}

    /// `OFPT_ECHO_REQUEST` arrived.
    async fn on_echo_request(&self, _dpid: u64, _msg: &Message) {}

    /// `OFPT_ECHO_REPLY` arrived and did not match a pending request.
    async fn on_echo_reply(&self, _dpid: u64, _msg: &Message) {}

    /// `OFPT_VENDOR` arrived.
    async fn on_vendor(&self, _dpid: u64, _msg: &Message) {}

    /// `OFPT_FEATURES_REQUEST` arrived (a switch asking the controller for its own features, unusual).
    async fn on_features_request(&self, _dpid: u64, _msg: &Message) {}

    /// `OFPT_FEATURES_REPLY` arrived outside of the handshake.
    async fn on_features_reply(&self, _dpid: u64, _msg: &Message) {}

    /// `OFPT_GET_CONFIG_REPLY` arrived.
    async fn on_get_config_reply(&self, _dpid: u64, _msg: &Message) {}

    /// `OFPT_SET_CONFIG` arrived.
    async fn on_set_config(&self, _dpid: u64, _msg: &Message) {}

    /// `OFPT_PACKET_IN` arrived.
    async fn on_packet_in(&self, _dpid: u64, _msg: &Message) {}

    /// `OFPT_FLOW_REMOVED` arrived.
    async fn on_flow_removed(&self, _dpid: u64, _msg: &Message) {}

    /// `OFPT_PORT_STATUS` arrived.
    async fn on_port_status(&self, _dpid: u64, _msg: &Message) {}

    /// `OFPT_PACKET_OUT` arrived (a switch echoing one back, unusual).
    async fn on_packet_out(&self, _dpid: u64, _msg: &Message) {}

    /// `OFPT_FLOW_MOD` arrived (a switch echoing one back, unusual).
    async fn on_flow_mod(&self, _dpid: u64, _msg: &Message) {}

    /// `OFPT_PORT_MOD` arrived.
    async fn on_port_mod(&self, _dpid: u64, _msg: &Message) {}

    /// `OFPT_STATS_REQUEST` arrived.
    async fn on_stats_request(&self, _dpid: u64, _msg: &Message) {}

    /// `OFPT_STATS_REPLY` arrived and did not match a pending request.
    async fn on_stats_reply(&self, _dpid: u64, _msg: &Message) {}

    /// `OFPT_BARRIER_REQUEST` arrived.
    async fn on_barrier_request(&self, _dpid: u64, _msg: &Message) {}

    /// `OFPT_BARRIER_REPLY` arrived and did not match a pending request.
    async fn on_barrier_reply(&self, _dpid: u64, _msg: &Message) {}
}
