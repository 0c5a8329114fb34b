//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → TOS_* environment overrides (+ *_FILE secrets)
//!     → validation.rs (semantic checks)
//!     → SyncConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_from, resolve_config_source, ConfigError, ConfigSource};
pub use schema::{
    ObservabilityConfig, OpnsenseConfig, ReconcileConfig, RegexConfig, SyncConfig, TraefikConfig,
};
pub use validation::ValidationError;
