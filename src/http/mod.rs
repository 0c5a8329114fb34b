//! HTTP transport subsystem.
//!
//! # Data Flow
//! ```text
//! traefik/ and opnsense/ clients
//!     → client.rs (json_request / request_no_content)
//!     → reqwest (timeout, TLS, basic auth)
//!     → 2xx: decoded body | otherwise: HttpError
//! ```
//!
//! # Design Decisions
//! - Every call has a deadline from configuration
//! - Error bodies are truncated to a short snippet for logs

pub mod client;

pub use client::{build_client, endpoint, Credentials, HttpError};
