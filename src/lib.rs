//! Digipos gateway library.
//!
//! Forwards Digipos account commands to a single upstream and normalizes
//! every response into one envelope, then renders it either as structured
//! JSON or as the flattened `key=value` text the legacy router reads.

// Core subsystems
pub mod config;
pub mod digipos;
pub mod error;
pub mod http;
pub mod pipeline;
pub mod upstream;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::schema::GatewayConfig;
pub use error::{GatewayError, GatewayResult};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
