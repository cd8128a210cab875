//! Digipos gateway binary.
//!
//! ```text
//!   caller ──GET /digipos/<command>──▶ http ──▶ digipos ──▶ upstream ──▶ Digipos
//!                                                  │
//!   caller ◀── legacy text / JSON ◀── http ◀── pipeline ◀── raw response
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use digipos_gateway::config::load_config;
use digipos_gateway::lifecycle::{wait_for_signal, Shutdown};
use digipos_gateway::observability::{logging, metrics};
use digipos_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "digipos-gateway", version, about = "Digipos response-normalizing gateway")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "gateway.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(&args.config)?;

    logging::init_logging(&config.observability);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %args.config.display(),
        "digipos-gateway starting"
    );

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        request_timeout_secs = config.timeouts.request_secs,
        retry_attempts = config.upstream.retry.max_attempts,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    let mut handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::select! {
        _ = wait_for_signal() => {
            shutdown.trigger();
            handle.await??;
        }
        result = &mut handle => result??,
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
