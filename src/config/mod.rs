//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! gateway.toml
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to the HTTP layer and services
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no process-wide singleton
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    DigiposConfig, DigiposEndpoints, GatewayConfig, LegacyConfig, ListenerConfig,
    ObservabilityConfig, ResponseConfig, ResponseMode, RetryConfig, TimeoutConfig,
    UpstreamConfig,
};
