//! Configuration loading from disk and environment.
//!
//! Precedence, lowest to highest: schema defaults, TOML file, `TOS_*`
//! environment variables. Any override may instead be read from the file
//! named by `TOS_<KEY>_FILE`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::SyncConfig;
use crate::config::validation::{has_router_filters, validate_config, ValidationError};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "TOS_";

/// Config file used when neither `--config` nor `TOS_CONFIG` is set.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { key: String, message: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { key, message } => write!(f, "Invalid {}: {}", key, message),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

/// Where the configuration file comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Named on the command line or via `TOS_CONFIG`; must exist.
    Explicit(PathBuf),
    /// The default path; may be absent.
    Default(PathBuf),
}

impl ConfigSource {
    pub fn path(&self) -> &Path {
        match self {
            ConfigSource::Explicit(p) | ConfigSource::Default(p) => p,
        }
    }
}

/// Pick the config file: `--config`, then `TOS_CONFIG`, then [`DEFAULT_CONFIG_PATH`].
pub fn resolve_config_source(
    cli_path: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> ConfigSource {
    if let Some(path) = cli_path {
        return ConfigSource::Explicit(path.to_path_buf());
    }
    match lookup("TOS_CONFIG").filter(|v| !v.trim().is_empty()) {
        Some(path) => ConfigSource::Explicit(PathBuf::from(path.trim())),
        None => ConfigSource::Default(PathBuf::from(DEFAULT_CONFIG_PATH)),
    }
}

/// Load from the resolved source, apply process environment overrides, validate.
pub fn load_from(
    source: &ConfigSource,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<SyncConfig, ConfigError> {
    let mut config = read_file(source)?;
    apply_env_overrides(&mut config, lookup)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    if !has_router_filters(&config) {
        tracing::warn!("No router filters configured; every Traefik router will be synced");
    }

    Ok(config)
}

fn read_file(source: &ConfigSource) -> Result<SyncConfig, ConfigError> {
    let path = source.path();
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e)
            if e.kind() == std::io::ErrorKind::NotFound
                && matches!(source, ConfigSource::Default(_)) =>
        {
            tracing::info!(
                path = %path.display(),
                "No config file found, using defaults and environment"
            );
            return Ok(SyncConfig::default());
        }
        Err(e) => return Err(ConfigError::Io(e)),
    };
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Read from the process environment.
pub fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

enum Slot<'a> {
    Str(&'a mut String),
    Bool(&'a mut bool),
    U64(&'a mut u64),
    Usize(&'a mut usize),
    List(&'a mut Vec<String>),
}

fn slots(config: &mut SyncConfig) -> Vec<(&'static str, Slot<'_>)> {
    let t = &mut config.traefik;
    let o = &mut config.opnsense;
    let r = &mut config.regex;
    let c = &mut config.reconcile;
    let obs = &mut config.observability;
    vec![
        ("DRY_RUN", Slot::Bool(&mut config.dry_run)),
        ("TRAEFIK_BASE_URL", Slot::Str(&mut t.base_url)),
        ("TRAEFIK_USERNAME", Slot::Str(&mut t.username)),
        ("TRAEFIK_PASSWORD", Slot::Str(&mut t.password)),
        ("TRAEFIK_VERIFY_TLS", Slot::Bool(&mut t.verify_tls)),
        ("TRAEFIK_TIMEOUT_SECS", Slot::U64(&mut t.timeout_secs)),
        ("TRAEFIK_INCLUDE_ENTRYPOINTS", Slot::List(&mut t.include_entrypoints)),
        ("TRAEFIK_IGNORE_ROUTERS", Slot::List(&mut t.ignore_routers)),
        ("TRAEFIK_INCLUDE_PROVIDERS", Slot::List(&mut t.include_providers)),
        ("TRAEFIK_IGNORE_PROVIDERS", Slot::List(&mut t.ignore_providers)),
        ("OPNSENSE_BASE_URL", Slot::Str(&mut o.base_url)),
        ("OPNSENSE_API_KEY", Slot::Str(&mut o.api_key)),
        ("OPNSENSE_API_SECRET", Slot::Str(&mut o.api_secret)),
        ("OPNSENSE_HOST_OVERRIDE", Slot::Str(&mut o.host_override)),
        ("OPNSENSE_VERIFY_TLS", Slot::Bool(&mut o.verify_tls)),
        ("OPNSENSE_TIMEOUT_SECS", Slot::U64(&mut o.timeout_secs)),
        ("REGEX_MAX_GENERATED", Slot::Usize(&mut r.max_generated)),
        ("REGEX_EXREX_PATH", Slot::Str(&mut r.exrex_path)),
        ("REGEX_TIMEOUT_SECS", Slot::U64(&mut r.timeout_secs)),
        ("RECONCILE_INTERVAL_SECS", Slot::U64(&mut c.interval_secs)),
        ("RECONCILE_DESCRIPTION_TAG", Slot::Str(&mut c.description_tag)),
        ("OBSERVABILITY_LOG_LEVEL", Slot::Str(&mut obs.log_level)),
        ("OBSERVABILITY_METRICS_ENABLED", Slot::Bool(&mut obs.metrics_enabled)),
        ("OBSERVABILITY_METRICS_ADDRESS", Slot::Str(&mut obs.metrics_address)),
    ]
}

/// Overlay `TOS_*` variables (or their `_FILE` variants) onto `config`.
pub fn apply_env_overrides(
    config: &mut SyncConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    for (suffix, slot) in slots(config) {
        let key = format!("{ENV_PREFIX}{suffix}");
        let Some(raw) = override_value(&key, &lookup) else {
            continue;
        };
        let invalid = |message: String| ConfigError::Env {
            key: key.clone(),
            message,
        };
        match slot {
            Slot::Str(field) => *field = raw,
            Slot::Bool(field) => {
                *field = parse_bool(&raw)
                    .ok_or_else(|| invalid(format!("expected a boolean, got {raw:?}")))?
            }
            Slot::U64(field) => {
                *field = raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| invalid(e.to_string()))?
            }
            Slot::Usize(field) => {
                *field = raw
                    .trim()
                    .parse::<usize>()
                    .map_err(|e| invalid(e.to_string()))?
            }
            Slot::List(field) => *field = split_list(&raw),
        }
    }
    Ok(())
}

fn override_value(key: &str, lookup: &impl Fn(&str) -> Option<String>) -> Option<String> {
    if let Some(value) = lookup(key) {
        return Some(value);
    }
    let file_key = format!("{key}_FILE");
    let path = lookup(&file_key).filter(|p| !p.trim().is_empty())?;
    let path = Path::new(path.trim());
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => {
            tracing::warn!(
                key = %file_key,
                path = %path.display(),
                "Secret path is not a regular file, ignoring"
            );
            return None;
        }
        Err(e) => {
            tracing::warn!(
                key = %file_key,
                path = %path.display(),
                error = %e,
                "Secret file unavailable, ignoring"
            );
            return None;
        }
    }
    match fs::read_to_string(path) {
        Ok(content) => Some(content.trim().to_string()),
        Err(e) => {
            tracing::warn!(
                key = %file_key,
                path = %path.display(),
                error = %e,
                "Failed to read secret file, ignoring"
            );
            None
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
