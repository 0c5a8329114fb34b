//! OPNsense Unbound API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use thiserror::Error;

use crate::http::client::{
    build_client, endpoint, json_request, request_no_content, Credentials, HttpError,
};
use crate::opnsense::types::{AddAliasRequest, AddAliasResponse, NewAlias, SearchResponse};
use crate::sync::types::HostAlias;

const SEARCH_HOST_OVERRIDE_API: &str = "/api/unbound/settings/search_host_override/";
const SEARCH_HOST_ALIAS_API: &str = "/api/unbound/settings/search_host_alias/";
const ADD_HOST_ALIAS_API: &str = "/api/unbound/settings/add_host_alias/";
const DELETE_HOST_ALIAS_API: &str = "/api/unbound/settings/del_host_alias/";
const RECONFIGURE_API: &str = "/api/unbound/service/reconfigure/";

/// Errors returned by an [`AliasStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("alias {0} has no id")]
    MissingId(String),

    #[error("alias {key} rejected with result {result:?}: {details}")]
    Rejected {
        key: String,
        result: String,
        details: String,
    },
}

/// The DNS override table aliases are synchronized into.
#[async_trait]
pub trait AliasStore: Send + Sync {
    /// Id of the host override whose `hostname.domain` equals `fqdn`,
    /// compared case-insensitively.
    async fn find_host_override(&self, fqdn: &str) -> Result<Option<String>, StoreError>;

    /// All aliases grouped under a host override.
    async fn aliases(&self, override_id: &str) -> Result<Vec<HostAlias>, StoreError>;

    /// Create an alias under a host override, returning its id.
    async fn create_alias(&self, alias: &HostAlias, override_id: &str)
        -> Result<String, StoreError>;

    async fn delete_alias(&self, alias: &HostAlias) -> Result<(), StoreError>;

    /// Apply pending changes to the running resolver.
    async fn apply(&self) -> Result<(), StoreError>;
}

/// [`AliasStore`] backed by the OPNsense Unbound API.
#[derive(Clone)]
pub struct OpnsenseClient {
    http: reqwest::Client,
    base_url: url::Url,
    credentials: Credentials,
}

impl OpnsenseClient {
    pub fn new(
        base_url: url::Url,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        timeout: Duration,
        verify_tls: bool,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: build_client(timeout, verify_tls)?,
            base_url,
            credentials: Credentials::new(api_key, api_secret),
        })
    }

    async fn search(&self, path: &str) -> Result<SearchResponse, HttpError> {
        let url = endpoint(&self.base_url, path)?;
        json_request(&self.http, Method::GET, url, None::<&()>, &self.credentials).await
    }
}

#[async_trait]
impl AliasStore for OpnsenseClient {
    async fn find_host_override(&self, fqdn: &str) -> Result<Option<String>, StoreError> {
        let resp = self.search(SEARCH_HOST_OVERRIDE_API).await?;
        Ok(resp
            .rows
            .into_iter()
            .find(|row| format!("{}.{}", row.hostname, row.domain).eq_ignore_ascii_case(fqdn))
            .map(|row| row.uuid))
    }

    async fn aliases(&self, override_id: &str) -> Result<Vec<HostAlias>, StoreError> {
        let resp = self
            .search(&format!("{SEARCH_HOST_ALIAS_API}{override_id}"))
            .await?;
        Ok(resp
            .rows
            .into_iter()
            .map(|row| HostAlias {
                id: Some(row.uuid),
                hostname: row.hostname,
                domain: row.domain,
                description: row.description,
            })
            .collect())
    }

    async fn create_alias(
        &self,
        alias: &HostAlias,
        override_id: &str,
    ) -> Result<String, StoreError> {
        let url = endpoint(&self.base_url, ADD_HOST_ALIAS_API)?;
        let body = AddAliasRequest {
            alias: NewAlias {
                enabled: "1",
                host: override_id,
                hostname: &alias.hostname,
                domain: &alias.domain,
                description: &alias.description,
            },
        };
        let resp: AddAliasResponse =
            json_request(&self.http, Method::POST, url, Some(&body), &self.credentials).await?;

        match resp.uuid {
            Some(uuid) if resp.result == "saved" => Ok(uuid),
            _ => Err(StoreError::Rejected {
                key: alias.key(),
                result: resp.result,
                details: resp
                    .validations
                    .map(|v| v.to_string())
                    .unwrap_or_default(),
            }),
        }
    }

    async fn delete_alias(&self, alias: &HostAlias) -> Result<(), StoreError> {
        let id = alias
            .id
            .as_deref()
            .ok_or_else(|| StoreError::MissingId(alias.key()))?;
        let url = endpoint(&self.base_url, &format!("{DELETE_HOST_ALIAS_API}{id}"))?;
        request_no_content(&self.http, Method::POST, url, None::<&()>, &self.credentials).await?;
        Ok(())
    }

    async fn apply(&self) -> Result<(), StoreError> {
        let url = endpoint(&self.base_url, RECONFIGURE_API)?;
        request_no_content(&self.http, Method::POST, url, None::<&()>, &self.credentials).await?;
        Ok(())
    }
}
