//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Upstream GET:
//!     → reqwest timeouts (connect + total, from config)
//!     → On failure: retries.rs (retryable status or connection error?)
//!     → backoff.rs (exponential delay with jitter before the next attempt)
//! ```
//!
//! # Design Decisions
//! - Only GET is issued upstream, so every attempt is idempotent
//! - A retryable status on the final attempt is returned, not raised
//! - Connection errors after the final attempt become transport errors

pub mod backoff;
pub mod retries;

pub use backoff::Backoff;
pub use retries::{is_retryable, RetryReason};
