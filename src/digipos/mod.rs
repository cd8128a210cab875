//! Digipos upstream commands.
//!
//! # Data Flow
//! ```text
//! HTTP handler
//!     → auth.rs (static username/password comparison)
//!     → service.rs (endpoint lookup, upstream GET)
//!     → pipeline::process (with types.rs schema for balance)
//! ```

pub mod auth;
pub mod service;
pub mod types;

pub use auth::CredentialGuard;
pub use service::{Command, DigiposService};
pub use types::{Balance, LoginParams, OtpParams, SimStatusParams, UsernameParams, BALANCE_SCHEMA};
