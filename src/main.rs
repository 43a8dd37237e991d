//! Forwarding Gateway
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │               FORWARDING GATEWAY             │
//!                        │                                              │
//!   Caller request       │  ┌─────────┐   ┌──────────┐   ┌───────────┐  │
//!   ─────────────────────┼─▶│  http   │──▶│ forward  │──▶│  upstream │──┼──▶ target_url
//!                        │  │ server  │   │ overlay/ │   │  client   │  │
//!                        │  └────┬────┘   │ outbound │   └─────┬─────┘  │
//!                        │       │        └──────────┘         │        │
//!                        │       ▼                             │        │
//!                        │  ┌─────────┐   credentialed_fetch    │        │
//!                        │  │ github  │─────────────────────────┼────────┼──▶ api.github.com
//!                        │  └─────────┘                         ▼        │
//!   Relayed response     │                               ┌───────────┐  │
//!   ◀────────────────────┼───────────────────────────────│   relay   │  │
//!                        │                               └───────────┘  │
//!                        │  config · observability · lifecycle          │
//!                        └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use forwarding_gateway::config::load_config;
use forwarding_gateway::lifecycle::{signals, Shutdown};
use forwarding_gateway::observability::{logging, metrics};
use forwarding_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "forwarding-gateway")]
#[command(about = "HTTP forwarding gateway with a GitHub issues relay", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listening port.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.listener.port = port;
    }

    logging::init_logging(&config.observability);

    tracing::info!("forwarding-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        allowed_origins = ?config.cors.allowed_origins,
        github_token = config.github.token.is_some(),
        upstream_timeout_secs = config.upstream.timeout_secs,
        max_body_bytes = config.limits.max_body_bytes,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config)?;

    tokio::spawn(async move {
        signals::forward_signals(&shutdown).await;
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
