//! Traefik integration.
//!
//! Reads the HTTP routers of a running Traefik instance. Only the name,
//! provider, entrypoints and rule of each router are kept.

pub mod client;
pub mod types;

pub use client::{RouteSource, TraefikClient};
pub use types::Router;
