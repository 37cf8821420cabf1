//! Media streaming gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client ──▶ http::server ──▶ routing (classify by backend pattern table)
//!                                   │
//!              ┌────────────────────┼──────────────────────┐
//!              ▼                    ▼                      ▼
//!        resolver (Download)   cache (Image/Subtitle)   everything else
//!        origin metadata query  hit ─▶ stored response     │
//!        strm rules + hooks     miss ─┐                    │
//!              │                      ▼                    ▼
//!        302 Location            http::proxy ─────────▶ Origin server
//! ```
//!
//! Cross-cutting: config (TOML), observability (tracing, Prometheus),
//! lifecycle (signals, graceful shutdown), admin API on its own listener.

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use media_gateway::admin::{setup_admin_router, AdminState};
use media_gateway::config::{load_config, GatewayConfig};
use media_gateway::http::HttpServer;
use media_gateway::lifecycle::{signals::spawn_signal_listener, Shutdown};
use media_gateway::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "media-gateway", version)]
#[command(about = "Reverse proxy gateway for Emby, Jellyfin and FNTV media servers")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Validate the configuration and exit
    #[arg(long)]
    check_config: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };
    if args.check_config {
        println!("configuration OK");
        return Ok(());
    }

    logging::init_logging(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "media-gateway starting");
    tracing::info!(
        backend = %config.backend,
        origin = %config.origin.url,
        bind_address = %config.listener.bind_address,
        strm_rules = config.strm.rules.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let server = HttpServer::new(&config)?;
    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());

    if config.admin.enabled {
        let admin_listener = TcpListener::bind(&config.admin.bind_address).await?;
        tracing::info!(address = %admin_listener.local_addr()?, "Admin API listening");
        let admin = setup_admin_router(AdminState::new(server.state(), &config.admin.api_key));
        let admin_shutdown = shutdown.wait();
        tokio::spawn(async move {
            if let Err(e) = axum::serve(admin_listener, admin)
                .with_graceful_shutdown(admin_shutdown)
                .await
            {
                tracing::error!(error = %e, "Admin API failed");
            }
        });
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
