//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML. Every
//! section has defaults so a minimal file (or none, with environment
//! overrides) is enough.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SyncConfig {
    /// Log planned operations without applying them, then exit.
    pub dry_run: bool,

    /// Traefik API access and router filters.
    pub traefik: TraefikConfig,

    /// OPNsense API access.
    pub opnsense: OpnsenseConfig,

    /// Regex host pattern expansion.
    pub regex: RegexConfig,

    /// Reconciliation loop settings.
    pub reconcile: ReconcileConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,
}

/// Traefik configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TraefikConfig {
    /// Base URL of the Traefik API (e.g., "http://traefik:8080").
    pub base_url: String,

    /// Basic auth username; empty disables auth.
    pub username: String,

    pub password: String,

    pub verify_tls: bool,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Only routers on at least one of these entrypoints.
    pub include_entrypoints: Vec<String>,

    /// Routers to skip, fully qualified (e.g., "dashboard@internal").
    pub ignore_routers: Vec<String>,

    /// Only routers from these providers.
    pub include_providers: Vec<String>,

    /// Skip routers from these providers.
    pub ignore_providers: Vec<String>,
}

impl Default for TraefikConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            username: String::new(),
            password: String::new(),
            verify_tls: true,
            timeout_secs: 10,
            include_entrypoints: Vec::new(),
            ignore_routers: Vec::new(),
            include_providers: Vec::new(),
            ignore_providers: Vec::new(),
        }
    }
}

/// OPNsense configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OpnsenseConfig {
    /// Base URL of the OPNsense web UI (e.g., "https://192.168.1.1").
    pub base_url: String,

    pub api_key: String,

    pub api_secret: String,

    /// `hostname.domain` of the Unbound host override aliases are grouped under.
    pub host_override: String,

    pub verify_tls: bool,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for OpnsenseConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            host_override: String::new(),
            verify_tls: true,
            timeout_secs: 10,
        }
    }
}

/// HostRegexp expansion configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RegexConfig {
    /// Maximum hostnames generated per pattern.
    pub max_generated: usize,

    /// exrex executable name or path.
    pub exrex_path: String,

    /// Per-invocation timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RegexConfig {
    fn default() -> Self {
        Self {
            max_generated: 5,
            exrex_path: "exrex".to_string(),
            timeout_secs: 5,
        }
    }
}

/// Reconciliation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Seconds between cycles.
    pub interval_secs: u64,

    /// Description stamped on every alias this tool creates.
    pub description_tag: String,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            description_tag: "Managed by traefik-opnsense-sync".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
