//! Turning domain candidates into hostname/domain pairs.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::domains::cache::ExpansionCache;
use crate::domains::generator::{GeneratorError, PatternGenerator};
use crate::routing::{DomainCandidate, DomainKind};

/// A fully qualified name split at its first dot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostName {
    pub hostname: String,
    pub domain: String,
}

impl fmt::Display for HostName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.hostname, self.domain)
    }
}

/// A candidate (or part of one) that produced no hostname.
#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error("failed to generate domains from regex {pattern:?}: {source}")]
    Generation {
        pattern: String,
        #[source]
        source: GeneratorError,
    },

    #[error("invalid domain {0:?}: expected <hostname>.<domain>")]
    MalformedDomain(String),
}

/// Split `value` into hostname and domain at the first `.`.
pub fn split_fqdn(value: &str) -> Result<HostName, MaterializeError> {
    match value.split_once('.') {
        Some((hostname, domain)) if !hostname.is_empty() && !domain.is_empty() => Ok(HostName {
            hostname: hostname.to_string(),
            domain: domain.to_string(),
        }),
        _ => Err(MaterializeError::MalformedDomain(value.to_string())),
    }
}

/// Result of materializing one candidate.
#[derive(Debug, Default)]
pub struct Materialized {
    pub hosts: Vec<HostName>,
    pub errors: Vec<MaterializeError>,
}

/// Expands pattern candidates through a [`PatternGenerator`], caching
/// results for the life of the process.
pub struct DomainMaterializer {
    generator: Arc<dyn PatternGenerator>,
    max_generated: usize,
    cache: ExpansionCache,
}

impl DomainMaterializer {
    pub fn new(generator: Arc<dyn PatternGenerator>, max_generated: usize) -> Self {
        Self {
            generator,
            max_generated,
            cache: ExpansionCache::new(),
        }
    }

    pub fn cache(&self) -> &ExpansionCache {
        &self.cache
    }

    /// Resolve a candidate into hostname/domain pairs.
    ///
    /// Generator failures and malformed names are returned alongside the
    /// pairs that did resolve; they never abort the caller.
    pub async fn materialize(&mut self, candidate: &DomainCandidate) -> Materialized {
        let mut out = Materialized::default();

        let names = match candidate.kind {
            DomainKind::Literal => vec![candidate.value.clone()],
            DomainKind::Pattern => match self.expand(&candidate.value).await {
                Ok(names) => names,
                Err(source) => {
                    out.errors.push(MaterializeError::Generation {
                        pattern: candidate.value.clone(),
                        source,
                    });
                    return out;
                }
            },
        };

        for name in names {
            match split_fqdn(&name) {
                Ok(host) => out.hosts.push(host),
                Err(e) => out.errors.push(e),
            }
        }
        out
    }

    async fn expand(&mut self, pattern: &str) -> Result<Vec<String>, GeneratorError> {
        if let Some(hit) = self.cache.get(pattern) {
            tracing::trace!(pattern, "pattern expansion served from cache");
            return Ok(hit.to_vec());
        }

        let names = self.generator.generate(pattern, self.max_generated).await?;
        tracing::debug!(pattern, generated = names.len(), "expanded host pattern");
        self.cache.insert(pattern, names.clone());
        Ok(names)
    }
}
