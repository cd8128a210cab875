//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, graceful shutdown)
//!     → request.rs (request ID)
//!     → digipos.rs (query extraction, DigiposService call)
//!     → response.rs (legacy text or structured JSON)
//!     → Send to client
//! ```

pub mod digipos;
pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use response::{OutputFlags, StructuredResponse};
pub use server::{AppState, HttpServer};
