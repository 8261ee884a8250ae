//! CORS Anywhere proxy (v1)
//!
//! A stateless forwarding proxy built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌────────────────────────────────────────────────────┐
//!                          │                    CORS PROXY                      │
//!                          │                                                    │
//!     Browser Request      │  ┌─────────┐    ┌──────────┐    ┌──────────────┐   │
//!     ─────────────────────┼─▶│  http   │───▶│ routing  │───▶│   policy     │   │
//!                          │  │ server  │    │ classify │    │   verdict    │   │
//!                          │  └─────────┘    └──────────┘    └──────┬───────┘   │
//!                          │                                        │           │
//!                          │                                        ▼           │
//!                          │                                 ┌──────────────┐   │
//!                          │                                 │  security    │   │
//!                          │                                 │header filter │   │
//!                          │                                 └──────┬───────┘   │
//!                          │                                        │           │
//!                          │                                        ▼           │
//!     Browser Response     │  ┌─────────┐                    ┌──────────────┐   │
//!     ◀────────────────────┼──│  cors   │◀───────────────────│  upstream    │◀──┼──── Target
//!                          │  │response │                    │   client     │   │
//!                          │  └─────────┘                    └──────────────┘   │
//!                          │                                                    │
//!                          │  Cross-cutting: config · observability ·           │
//!                          │                 resilience (deadline) · lifecycle  │
//!                          └────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use corsanywhere::config::{load_config, ProxyConfig};
use corsanywhere::lifecycle::Shutdown;
use corsanywhere::observability::init_logging;
use corsanywhere::HttpServer;

#[derive(Parser)]
#[command(name = "corsanywhere")]
#[command(about = "Forwarding proxy that adds CORS headers to any response", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    init_logging(&config.observability);

    tracing::info!("corsanywhere v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        whitelist_urls = config.policy.whitelist_urls.len(),
        blacklist_urls = config.policy.blacklist_urls.len(),
        whitelist_origins = config.policy.whitelist_origins.len(),
        upstream_timeout_secs = config.timeouts.upstream_secs,
        "Configuration loaded"
    );

    // Bind TCP listener
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
