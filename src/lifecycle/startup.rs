//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the Traefik and OPNsense clients from validated configuration
//! - Wire the generator, materializer, filter and engine together
//! - Hand back a [`Reconciler`] ready to run
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - No network calls here; the first cycle is the first contact

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::config::SyncConfig;
use crate::domains::{DomainMaterializer, ExrexGenerator};
use crate::http::Credentials;
use crate::opnsense::OpnsenseClient;
use crate::sync::{Reconciler, RouterFilter, SyncEngine, SyncRunner};
use crate::traefik::TraefikClient;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid {field}: {source}")]
    Url {
        field: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build {service} HTTP client: {source}")]
    Client {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

/// Build the reconcile loop described by `config`.
///
/// `dry_run` is the effective setting (CLI flag or config).
pub fn build_reconciler(config: &SyncConfig, dry_run: bool) -> Result<Reconciler, StartupError> {
    let traefik_url = parse_url("traefik.base_url", &config.traefik.base_url)?;
    let opnsense_url = parse_url("opnsense.base_url", &config.opnsense.base_url)?;

    let routes = TraefikClient::new(
        traefik_url,
        Credentials::new(&config.traefik.username, &config.traefik.password),
        Duration::from_secs(config.traefik.timeout_secs),
        config.traefik.verify_tls,
    )
    .map_err(|source| StartupError::Client {
        service: "traefik",
        source,
    })?;

    let store = OpnsenseClient::new(
        opnsense_url,
        &config.opnsense.api_key,
        &config.opnsense.api_secret,
        Duration::from_secs(config.opnsense.timeout_secs),
        config.opnsense.verify_tls,
    )
    .map_err(|source| StartupError::Client {
        service: "opnsense",
        source,
    })?;

    if !config.traefik.verify_tls || !config.opnsense.verify_tls {
        tracing::warn!(
            traefik = config.traefik.verify_tls,
            opnsense = config.opnsense.verify_tls,
            "TLS certificate verification disabled"
        );
    }

    let generator = ExrexGenerator::new(
        config.regex.exrex_path.clone(),
        Duration::from_secs(config.regex.timeout_secs),
    );
    let materializer = DomainMaterializer::new(Arc::new(generator), config.regex.max_generated);
    let filter = RouterFilter::from_config(&config.traefik);
    let engine = SyncEngine::new(filter, materializer, config.reconcile.description_tag.clone());

    let runner = SyncRunner::new(
        engine,
        Arc::new(routes),
        Arc::new(store),
        config.opnsense.host_override.clone(),
        dry_run,
    );

    tracing::info!(
        traefik = %config.traefik.base_url,
        opnsense = %config.opnsense.base_url,
        host_override = %config.opnsense.host_override,
        interval_secs = config.reconcile.interval_secs,
        dry_run,
        "Sync components initialized"
    );

    Ok(Reconciler::new(
        runner,
        Duration::from_secs(config.reconcile.interval_secs),
    ))
}

fn parse_url(field: &'static str, raw: &str) -> Result<url::Url, StartupError> {
    url::Url::parse(raw).map_err(|source| StartupError::Url { field, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SyncConfig {
        let mut config = SyncConfig::default();
        config.traefik.base_url = "http://traefik:8080".to_string();
        config.opnsense.base_url = "https://fw.lan".to_string();
        config.opnsense.api_key = "key".to_string();
        config.opnsense.api_secret = "secret".to_string();
        config.opnsense.host_override = "proxy.lan".to_string();
        config
    }

    #[test]
    fn test_build_reconciler() {
        assert!(build_reconciler(&config(), false).is_ok());
    }

    #[test]
    fn test_rejects_bad_url() {
        let mut config = config();
        config.opnsense.base_url = "::nope".to_string();
        match build_reconciler(&config, false) {
            Err(StartupError::Url { field, .. }) => assert_eq!(field, "opnsense.base_url"),
            other => panic!("expected url error, got {:?}", other.err()),
        }
    }
}
