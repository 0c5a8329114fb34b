//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Build clients → Build engine → Reconciler
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     broadcast → reconcile loop drops the in-flight cycle → exit
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Partially applied plans are not undone on shutdown

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{build_reconciler, StartupError};
