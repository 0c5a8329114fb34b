//! Shared JSON-over-HTTP client plumbing.
//!
//! # Responsibilities
//! - Build reqwest clients with a deadline and optional TLS verification
//! - Issue JSON requests with basic auth
//! - Turn non-2xx responses into typed errors with a body snippet

use std::time::Duration;

use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Longest response body kept in an error.
const SNIPPET_LIMIT: usize = 4 * 1024;

/// Transport-level failures talking to Traefik or OPNsense.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("http {status} from {url}: {snippet:?}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
        snippet: String,
    },

    #[error("invalid response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Build a client for one upstream service.
pub fn build_client(timeout: Duration, verify_tls: bool) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .danger_accept_invalid_certs(!verify_tls)
        .build()
}

/// Basic-auth credentials attached to every request.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Join an API path onto a base URL, keeping any base path prefix.
pub fn endpoint(base: &url::Url, path: &str) -> Result<url::Url, HttpError> {
    let mut joined = base.as_str().trim_end_matches('/').to_string();
    joined.push_str(path);
    url::Url::parse(&joined).map_err(|source| HttpError::InvalidUrl {
        url: joined,
        source,
    })
}

/// Send a request and decode a JSON response.
///
/// `body` is serialized as JSON when present. Auth is skipped when the
/// username is empty.
pub async fn json_request<B, T>(
    client: &Client,
    method: Method,
    url: url::Url,
    body: Option<&B>,
    credentials: &Credentials,
) -> Result<T, HttpError>
where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let response = send(client, method, url, body, credentials).await?;
    let url = response.url().to_string();
    response
        .json::<T>()
        .await
        .map_err(|source| HttpError::Decode { url, source })
}

/// Send a request and discard the response body.
pub async fn request_no_content<B>(
    client: &Client,
    method: Method,
    url: url::Url,
    body: Option<&B>,
    credentials: &Credentials,
) -> Result<(), HttpError>
where
    B: Serialize + ?Sized,
{
    send(client, method, url, body, credentials).await?;
    Ok(())
}

async fn send<B>(
    client: &Client,
    method: Method,
    url: url::Url,
    body: Option<&B>,
    credentials: &Credentials,
) -> Result<reqwest::Response, HttpError>
where
    B: Serialize + ?Sized,
{
    let url_str = url.to_string();
    let mut request = client
        .request(method, url)
        .header(reqwest::header::ACCEPT, "application/json");
    if let Some(body) = body {
        request = request.json(body);
    }
    if !credentials.username.is_empty() {
        request = request.basic_auth(&credentials.username, Some(&credentials.password));
    }

    let response = request.send().await.map_err(|source| HttpError::Request {
        url: url_str.clone(),
        source,
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let mut end = body.len().min(SNIPPET_LIMIT);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    Err(HttpError::Status {
        status,
        url: url_str,
        snippet: body[..end].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_keeps_base_path() {
        let base = url::Url::parse("https://proxy.lan/traefik/").unwrap();
        let url = endpoint(&base, "/api/http/routers").unwrap();
        assert_eq!(url.as_str(), "https://proxy.lan/traefik/api/http/routers");

        let base = url::Url::parse("https://fw.lan").unwrap();
        let url = endpoint(&base, "/api/unbound/service/reconfigure/").unwrap();
        assert_eq!(url.as_str(), "https://fw.lan/api/unbound/service/reconfigure/");
    }

    #[test]
    fn test_error_display() {
        let err = HttpError::Status {
            status: reqwest::StatusCode::UNAUTHORIZED,
            url: "https://fw.lan/api".to_string(),
            snippet: "denied".to_string(),
        };
        assert!(err.to_string().contains("401"));
        assert!(err.to_string().contains("denied"));
    }
}
