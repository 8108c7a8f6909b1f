//! Multi-room WebSocket chat server.
//!
//! Rooms are created and listed over HTTP; joining a room upgrades the
//! connection to a WebSocket and broadcasts messages to every room member.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin server
//! cargo run --bin server -- --host 0.0.0.0 --port 3000
//! ```

use clap::Parser;
use roomcast::{common::logger::setup_logger, server::run_server};

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Multi-room WebSocket chat server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Browser origin allowed by the CORS policy
    #[arg(long, default_value = "http://localhost:3000")]
    origin: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    if let Err(e) = run_server(args.host, args.port, args.origin).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
