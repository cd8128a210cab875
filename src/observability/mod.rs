//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters and histograms)
//!
//! Consumers:
//!     → stdout (fmt layer, filtered by RUST_LOG or config)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows from the inbound layer into every log line
//! - Query strings and credentials never reach a log field
//! - Metric calls are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
