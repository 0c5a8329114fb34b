//! Traefik API types.

use serde::{Deserialize, Serialize};

/// An HTTP router as reported by `GET /api/http/routers`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Router {
    /// Fully qualified name, e.g. `whoami@docker`.
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub provider: String,

    #[serde(default, rename = "entryPoints")]
    pub entry_points: Vec<String>,

    #[serde(default)]
    pub rule: String,
}

impl Router {
    pub fn new(
        name: impl Into<String>,
        provider: impl Into<String>,
        rule: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            provider: provider.into(),
            entry_points: Vec::new(),
            rule: rule.into(),
        }
    }

    pub fn with_entry_points<I, S>(mut self, entry_points: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entry_points = entry_points.into_iter().map(Into::into).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_api_payload() {
        let json = r#"[{
            "entryPoints": ["websecure"],
            "service": "whoami",
            "rule": "Host(`whoami.example.com`)",
            "status": "enabled",
            "using": ["websecure"],
            "name": "whoami@docker",
            "provider": "docker"
        }]"#;
        let routers: Vec<Router> = serde_json::from_str(json).unwrap();
        assert_eq!(
            routers,
            vec![Router::new("whoami@docker", "docker", "Host(`whoami.example.com`)")
                .with_entry_points(["websecure"])]
        );
    }
}
