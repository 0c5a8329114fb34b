//! Keeps OPNsense Unbound host aliases in step with the hostnames Traefik routes.

pub mod config;
pub mod domains;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod opnsense;
pub mod routing;
pub mod sync;
pub mod traefik;

pub use config::SyncConfig;
pub use error::SyncError;
pub use lifecycle::Shutdown;
pub use routing::extract_candidates;
pub use sync::{Reconciler, SyncEngine};
