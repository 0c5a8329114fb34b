//! Router selection.
//!
//! # Design Decisions
//! - Every filter is optional; an empty set disables it
//! - Include and ignore provider sets are mutually exclusive, enforced at
//!   config validation rather than here
//! - Router names are compared exactly, including the `@provider` suffix

use std::collections::HashSet;

use crate::config::schema::TraefikConfig;
use crate::traefik::Router;

/// Decides which routers take part in reconciliation.
#[derive(Debug, Clone, Default)]
pub struct RouterFilter {
    include_entry_points: HashSet<String>,
    include_providers: HashSet<String>,
    ignore_providers: HashSet<String>,
    ignore_routers: HashSet<String>,
}

impl RouterFilter {
    pub fn from_config(config: &TraefikConfig) -> Self {
        Self {
            include_entry_points: config.include_entrypoints.iter().cloned().collect(),
            include_providers: config.include_providers.iter().cloned().collect(),
            ignore_providers: config.ignore_providers.iter().cloned().collect(),
            ignore_routers: config.ignore_routers.iter().cloned().collect(),
        }
    }

    pub fn include_entry_points<I, S>(mut self, eps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_entry_points = eps.into_iter().map(Into::into).collect();
        self
    }

    pub fn include_providers<I: IntoIterator<Item = S>, S: Into<String>>(mut self, p: I) -> Self {
        self.include_providers = p.into_iter().map(Into::into).collect();
        self
    }

    pub fn ignore_providers<I: IntoIterator<Item = S>, S: Into<String>>(mut self, p: I) -> Self {
        self.ignore_providers = p.into_iter().map(Into::into).collect();
        self
    }

    pub fn ignore_routers<I: IntoIterator<Item = S>, S: Into<String>>(mut self, names: I) -> Self {
        self.ignore_routers = names.into_iter().map(Into::into).collect();
        self
    }

    /// True when no filter is configured and every router is eligible.
    pub fn is_empty(&self) -> bool {
        self.include_entry_points.is_empty()
            && self.include_providers.is_empty()
            && self.ignore_providers.is_empty()
            && self.ignore_routers.is_empty()
    }

    pub fn accepts(&self, router: &Router) -> bool {
        if !self.include_entry_points.is_empty()
            && !router
                .entry_points
                .iter()
                .any(|ep| self.include_entry_points.contains(ep))
        {
            return false;
        }
        if !self.include_providers.is_empty() && !self.include_providers.contains(&router.provider)
        {
            return false;
        }
        if self.ignore_providers.contains(&router.provider) {
            return false;
        }
        !self.ignore_routers.contains(&router.name)
    }
}
