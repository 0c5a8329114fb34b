//! Domain materialization subsystem.
//!
//! # Data Flow
//! ```text
//! DomainCandidate
//!     → Literal: used as-is
//!     → Pattern: cache.rs hit, or generator.rs (exrex, capped, 5s deadline)
//!     → materializer.rs splits each name at the first '.'
//!     → Vec<HostName> + per-item errors
//! ```
//!
//! # Design Decisions
//! - Generator failures are per pattern and never abort a cycle
//! - Only successful expansions are cached
//! - Malformed names are reported, not silently dropped

pub mod cache;
pub mod generator;
pub mod materializer;

pub use cache::ExpansionCache;
pub use generator::{ExrexGenerator, GeneratorError, PatternGenerator};
pub use materializer::{split_fqdn, DomainMaterializer, HostName, MaterializeError, Materialized};
