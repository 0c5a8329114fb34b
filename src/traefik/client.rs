//! Traefik API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;

use crate::http::client::{build_client, endpoint, json_request, Credentials, HttpError};
use crate::traefik::types::Router;

const ROUTERS_API: &str = "/api/http/routers";

/// Source of the routers the proxy is currently serving.
#[async_trait]
pub trait RouteSource: Send + Sync {
    async fn routers(&self) -> Result<Vec<Router>, HttpError>;
}

/// [`RouteSource`] reading Traefik's live configuration API.
#[derive(Clone)]
pub struct TraefikClient {
    http: reqwest::Client,
    base_url: url::Url,
    credentials: Credentials,
}

impl TraefikClient {
    pub fn new(
        base_url: url::Url,
        credentials: Credentials,
        timeout: Duration,
        verify_tls: bool,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: build_client(timeout, verify_tls)?,
            base_url,
            credentials,
        })
    }
}

#[async_trait]
impl RouteSource for TraefikClient {
    async fn routers(&self) -> Result<Vec<Router>, HttpError> {
        let url = endpoint(&self.base_url, ROUTERS_API)?;
        let routers: Vec<Router> =
            json_request(&self.http, Method::GET, url, None::<&()>, &self.credentials).await?;
        tracing::debug!(count = routers.len(), "fetched routers from Traefik");
        Ok(routers)
    }
}
