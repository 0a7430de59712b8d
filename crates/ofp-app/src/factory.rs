//! The zero-argument factory functions applications are registered with (§4.4).

use std::sync::Arc;

use ofp_core::Application;

/// A zero-argument factory producing one application instance per connected switch.
///
/// The controller invokes every registered factory once per successful
/// handshake; the returned instance is appended to that switch's application
/// list. A factory typically closes over shared, process-wide state (e.g. the
/// network registry) that every instance it produces needs in order to look
/// up its own switch by datapath id.
pub type ApplicationFactory = Arc<dyn Fn() -> Arc<dyn Application> + Send + Sync>;
