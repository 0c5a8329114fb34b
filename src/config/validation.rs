//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Required credentials and endpoints
//! - Value ranges (counts and intervals > 0)
//! - Conflicting router filters
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SyncConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;

use crate::config::schema::SyncConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

/// Validate a fully loaded configuration.
pub fn validate_config(config: &SyncConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let required = [
        ("traefik.base_url", &config.traefik.base_url),
        ("opnsense.base_url", &config.opnsense.base_url),
        ("opnsense.api_key", &config.opnsense.api_key),
        ("opnsense.api_secret", &config.opnsense.api_secret),
        ("opnsense.host_override", &config.opnsense.host_override),
        ("reconcile.description_tag", &config.reconcile.description_tag),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            errors.push(ValidationError::new(field, "is required"));
        }
    }

    for (field, value) in [
        ("traefik.base_url", &config.traefik.base_url),
        ("opnsense.base_url", &config.opnsense.base_url),
    ] {
        if value.trim().is_empty() {
            continue;
        }
        match url::Url::parse(value) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(ValidationError::new(
                field,
                format!("must use http or https, got {:?}", url.scheme()),
            )),
            Err(e) => errors.push(ValidationError::new(field, format!("is not a valid URL: {e}"))),
        }
    }

    if config.regex.max_generated == 0 {
        errors.push(ValidationError::new("regex.max_generated", "must be > 0"));
    }
    if config.regex.timeout_secs == 0 {
        errors.push(ValidationError::new("regex.timeout_secs", "must be > 0"));
    }
    if config.reconcile.interval_secs == 0 {
        errors.push(ValidationError::new("reconcile.interval_secs", "must be > 0"));
    }

    for router in &config.traefik.ignore_routers {
        if !router.contains('@') {
            errors.push(ValidationError::new(
                "traefik.ignore_routers",
                format!(
                    "entry {router:?} must include provider suffix, \
                     e.g. 'router@docker' or 'router@file'"
                ),
            ));
        }
    }

    if !config.traefik.ignore_providers.is_empty() && !config.traefik.include_providers.is_empty() {
        errors.push(ValidationError::new(
            "traefik.ignore_providers",
            "and traefik.include_providers are mutually exclusive",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// True when at least one router filter narrows the router set.
pub fn has_router_filters(config: &SyncConfig) -> bool {
    let t = &config.traefik;
    !(t.include_entrypoints.is_empty()
        && t.ignore_routers.is_empty()
        && t.include_providers.is_empty()
        && t.ignore_providers.is_empty())
}
