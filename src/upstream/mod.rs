//! Upstream transport subsystem.
//!
//! # Data Flow
//! ```text
//! DigiposService
//!     → client.rs (join endpoint, GET with query, retry + backoff)
//!     → response.rs (status, headers, body fully read, url, elapsed)
//!     → pipeline::process
//! ```

pub mod client;
pub mod response;

pub use client::UpstreamClient;
pub use response::UpstreamResponse;
