//! OPNsense Unbound API payloads.

use serde::{Deserialize, Serialize};

/// Response of the `search_host_override` and `search_host_alias` endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub rows: Vec<SearchRow>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRow {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub description: String,
}

/// Body of `add_host_alias`.
#[derive(Debug, Clone, Serialize)]
pub struct AddAliasRequest<'a> {
    pub alias: NewAlias<'a>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewAlias<'a> {
    pub enabled: &'a str,
    /// UUID of the parent host override.
    pub host: &'a str,
    pub hostname: &'a str,
    pub domain: &'a str,
    pub description: &'a str,
}

/// Response of `add_host_alias`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddAliasResponse {
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub validations: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_request_shape() {
        let body = AddAliasRequest {
            alias: NewAlias {
                enabled: "1",
                host: "parent-uuid",
                hostname: "svc",
                domain: "example.com",
                description: "managed",
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["alias"]["host"], "parent-uuid");
        assert_eq!(json["alias"]["enabled"], "1");
    }

    #[test]
    fn test_search_rows_tolerate_missing_fields() {
        let resp: SearchResponse =
            serde_json::from_str(r#"{"rows":[{"uuid":"a","hostname":"svc"}],"total":1}"#).unwrap();
        assert_eq!(resp.rows.len(), 1);
        assert_eq!(resp.rows[0].domain, "");
    }
}
