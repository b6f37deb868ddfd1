//! Shared real-time session server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin tandem-server
//! cargo run --bin tandem-server -- --host 0.0.0.0 --port 3000 --static-dir public
//! ```

use std::{collections::HashMap, path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;
use tandem_server::{
    config::{KeepAliveConfig, PresenceConfig, ServerConfig},
    infrastructure::message_pusher::WebSocketMessagePusher,
    ui::Server,
    usecase::SessionActor,
};
use tandem_shared::{logger::setup_logger, time::SystemClock};
use tokio::sync::Mutex;

#[derive(Parser, Debug)]
#[command(name = "tandem-server")]
#[command(about = "Shared real-time session server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "3000")]
    port: u16,

    /// Directory served for every non-API path
    #[arg(long, default_value = "public")]
    static_dir: PathBuf,

    /// Interval between server pings
    #[arg(long, default_value = "25000", value_parser = clap::value_parser!(u64).range(1..))]
    keep_alive_interval_ms: u64,

    /// Extra silence tolerated after a missed ping before the socket is closed
    #[arg(long, default_value = "60000")]
    keep_alive_timeout_ms: u64,

    /// Inactivity after which a participant is expired
    #[arg(long, default_value = "120000")]
    idle_threshold_ms: u64,

    /// Interval of the idle sweep
    #[arg(long, default_value = "60000", value_parser = clap::value_parser!(u64).range(1..))]
    sweep_interval_ms: u64,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            static_dir: args.static_dir,
            keep_alive: KeepAliveConfig {
                interval: Duration::from_millis(args.keep_alive_interval_ms),
                timeout: Duration::from_millis(args.keep_alive_timeout_ms),
            },
            presence: PresenceConfig {
                idle_threshold: Duration::from_millis(args.idle_threshold_ms),
                sweep_interval: Duration::from_millis(args.sweep_interval_ms),
            },
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let config = ServerConfig::from(Args::parse());

    // Initialize dependencies in order:
    // 1. MessagePusher
    // 2. Session actor (owns the session context)
    // 3. Server

    // 1. Create MessagePusher (WebSocket implementation)
    let message_pusher_clients = Arc::new(Mutex::new(HashMap::new()));
    let message_pusher = Arc::new(WebSocketMessagePusher::new(message_pusher_clients));

    // 2. Start the session
    let (session, session_task) =
        SessionActor::spawn(message_pusher, Arc::new(SystemClock), config.presence);

    // 3. Create and run the server
    let server = Server::new(session, config);
    let result = server.run().await;

    if let Err(e) = session_task.await {
        tracing::error!("Session task failed: {}", e);
    }
    if let Err(e) = result {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
