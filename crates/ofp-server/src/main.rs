//! Binary entry point: parse configuration, install logging, register the
//! worked applications, and listen (§6).

use std::sync::Arc;

use clap::Parser;
use ofp_app::{Application, EchoResponder, LinkDiscovery};
use ofp_server::{Args, Controller};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_filter)))
        .init();

    let mut controller = Controller::new();
    let registry = controller.registry();

    let echo_registry = Arc::clone(&registry);
    controller.register(Arc::new(move || Arc::new(EchoResponder::new(Arc::clone(&echo_registry))) as Arc<dyn Application>));

    let discovery_registry = Arc::clone(&registry);
    controller.register(Arc::new(move || {
        Arc::new(LinkDiscovery::new(Arc::clone(&discovery_registry))) as Arc<dyn Application>
    }));

    let controller = Arc::new(controller);
    if let Err(e) = controller.listen(args.listen).await {
        tracing::error!(error = %e, "controller exited");
        std::process::exit(1);
    }
}
