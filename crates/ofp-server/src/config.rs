//! Command-line configuration (§6, §10): read once at process start.

use clap::Parser;

/// OpenFlow 1.0 controller runtime.
#[derive(Parser, Debug)]
#[command(name = "ofp-controller", about = "OpenFlow 1.0 controller runtime", version)]
pub struct Args {
    /// Address and port to listen for switch connections on.
    #[arg(long, default_value = "0.0.0.0:6633")]
    pub listen: std::net::SocketAddr,

    /// `tracing-subscriber` `EnvFilter` directive; overridden by `RUST_LOG` if set.
    #[arg(long, default_value = "info")]
    pub log_filter: String,
}
