//! Stack Gateway (v1)
//!
//! A small authenticating gateway built with Tokio and Axum that forwards
//! stack operations to a Portainer instance.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌───────────────────────────────────────────────┐
//!                        │                 STACK GATEWAY                 │
//!                        │                                               │
//!     Client Request     │  ┌─────────┐   ┌────────────┐   ┌──────────┐  │
//!     ───────────────────┼─▶│  http   │──▶│ dispatcher │──▶│ routing  │  │
//!       X-API-Key        │  │ server  │   │ (api key)  │   │  table   │  │
//!                        │  └─────────┘   └─────┬──────┘   └────┬─────┘  │
//!                        │                      │               │        │
//!                        │                      ▼               ▼        │
//!     Client Response    │               ┌────────────┐   ┌──────────┐   │
//!     ◀──────────────────┼───────────────│  errors →  │◀──│ handlers │   │
//!                        │               │  response  │   └────┬─────┘   │
//!                        │               └────────────┘        │         │
//!                        │                                     ▼         │
//!                        │                              ┌────────────┐   │     Portainer
//!                        │                              │ portainer  │───┼───▶   API
//!                        │                              │  client    │   │
//!                        │                              └────────────┘   │
//!                        └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use stack_gateway::config::load_config;
use stack_gateway::handlers::default_routes;
use stack_gateway::lifecycle::{wait_for_signal, Shutdown};
use stack_gateway::observability::{logging, metrics};
use stack_gateway::portainer::PortainerFactory;
use stack_gateway::{Dispatcher, HttpServer};

#[derive(Parser)]
#[command(name = "stack-gateway")]
#[command(about = "Authenticating gateway for the Portainer stack API", long_about = None)]
struct Args {
    /// Optional TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Missing BASE_URL stops us here, before anything listens.
    let config = load_config(args.config.as_deref(), args.bind.as_deref())?;

    logging::init_logging(&config.observability.log_level)?;
    tracing::info!("stack-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    let base_url = config.base_url()?;
    tracing::info!(
        bind_address = %config.listener.bind_address,
        base_url = %base_url,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let routes = default_routes()?;
    let factory = PortainerFactory::new(reqwest::Client::new(), base_url);
    let server = HttpServer::new(Dispatcher::new(routes, factory));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, signal).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
