//! Inflow Server - Stream Emission Simulator
//!
//! The demo server for the boundary-replacement protocol. It serves a
//! landing page, two streaming endpoints (the bare patch variant and the
//! instruction-queue variant), and a rendered tutorial.
//!
//! # Usage
//!
//! ```bash
//! # Start with defaults (127.0.0.1:3012, 3s simulated delays)
//! inflow-server
//!
//! # Faster chunk cadence
//! inflow-server --delay-ms 500
//!
//! # Custom listen address and tutorial document
//! inflow-server --listen 0.0.0.0:8080 --guide docs/guide.md
//!
//! # Verbose logging
//! RUST_LOG=debug inflow-server
//! ```

mod pages;
mod routes;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use routes::{ServerState, StreamConfig};

/// Inflow server - streamed boundary-replacement demo
#[derive(Parser, Debug)]
#[command(name = "inflow-server")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Address to listen on
    #[arg(short = 'l', long, env = "INFLOW_LISTEN", default_value = "127.0.0.1:3012")]
    listen: SocketAddr,

    /// Simulated delay before each content chunk, in milliseconds
    #[arg(short = 'd', long, env = "INFLOW_DELAY_MS", default_value_t = 3000)]
    delay_ms: u64,

    /// Path to the tutorial document rendered at /guide
    #[arg(short = 'g', long, env = "INFLOW_GUIDE", default_value = "docs/guide.md")]
    guide: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "INFLOW_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

/// Initialize logging with the specified level
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("inflow_server={level},inflow_core={level}"))
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let state = ServerState {
        stream: StreamConfig {
            chunk_delay: Duration::from_millis(args.delay_ms),
        },
        guide_path: args.guide,
    };
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("failed to bind to {}", args.listen))?;
    info!(addr = %args.listen, delay_ms = args.delay_ms, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shutdown complete");
    Ok(())
}
