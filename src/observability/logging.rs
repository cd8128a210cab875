//! Structured logging setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Directive used when `RUST_LOG` is not set.
pub fn default_directive(config: &ObservabilityConfig) -> String {
    format!(
        "digipos_gateway={level},gateway_cli={level},tower_http={level}",
        level = config.log_level
    )
}

/// Install the global subscriber. `RUST_LOG` takes precedence over config.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config)));

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    if let Err(e) = result {
        eprintln!("logging already initialized: {e}");
    }
}
