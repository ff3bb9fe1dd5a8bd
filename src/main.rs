//! Waypoint server binary.
//!
//! Loads configuration, builds and freezes the route table, then serves it
//! until SIGINT/SIGTERM.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use waypoint::config::{load_config, ServerConfig};
use waypoint::lifecycle::{self, signals, Shutdown};
use waypoint::observability::{logging, metrics};
use waypoint::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "waypoint", version, about = "HTTP request router with middleware chains")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address
    #[arg(short, long)]
    bind: Option<String>,

    /// Print the route table and exit
    #[arg(long)]
    routes: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability.log_level);
    tracing::info!("waypoint v{} starting", env!("CARGO_PKG_VERSION"));

    let router = lifecycle::build_router(&config)?;

    if cli.routes {
        for (method, pattern) in router.routes() {
            println!("{:<8} {}", method.as_str(), pattern);
        }
        return Ok(());
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        max_body_size = config.limits.max_body_size,
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

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_rx = shutdown.subscribe();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        signals::trigger_on_signal(&signal_shutdown).await;
    });

    HttpServer::new(config, router).run(listener, server_rx).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
