//! One reconciliation cycle.

use std::sync::Arc;

use crate::error::SyncError;
use crate::opnsense::AliasStore;
use crate::sync::engine::SyncEngine;
use crate::sync::executor::execute_plan;
use crate::traefik::RouteSource;

/// Counters describing a finished cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub desired: usize,
    pub managed: usize,
    pub planned: usize,
    pub created: usize,
    pub deleted: usize,
    pub failed: usize,
    /// Routers or candidates that were skipped.
    pub skipped: usize,
    pub dry_run: bool,
}

/// Fetches both snapshots, plans, and applies.
pub struct SyncRunner {
    engine: SyncEngine,
    routes: Arc<dyn RouteSource>,
    store: Arc<dyn AliasStore>,
    host_override: String,
    dry_run: bool,
}

impl SyncRunner {
    pub fn new(
        engine: SyncEngine,
        routes: Arc<dyn RouteSource>,
        store: Arc<dyn AliasStore>,
        host_override: impl Into<String>,
        dry_run: bool,
    ) -> Self {
        Self {
            engine,
            routes,
            store,
            host_override: host_override.into(),
            dry_run,
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Run a single cycle.
    ///
    /// Transport failures abort before any change. Operation failures do
    /// not stop the plan but turn the result into [`SyncError::Partial`].
    pub async fn sync_once(&mut self) -> Result<CycleSummary, SyncError> {
        let override_id = self
            .store
            .find_host_override(&self.host_override)
            .await
            .map_err(|source| SyncError::HostOverrideLookup {
                fqdn: self.host_override.clone(),
                source,
            })?
            .ok_or_else(|| SyncError::HostOverrideNotFound(self.host_override.clone()))?;

        let store = Arc::clone(&self.store);
        let routes = Arc::clone(&self.routes);
        let (aliases, routers) = tokio::try_join!(
            async { store.aliases(&override_id).await.map_err(SyncError::Store) },
            async { routes.routers().await.map_err(SyncError::Routes) },
        )?;

        let report = self.engine.compute_plan(&routers, &aliases).await;
        let mut summary = CycleSummary {
            desired: report.desired,
            managed: report.managed,
            planned: report.plan.len(),
            skipped: report.issues.len(),
            dry_run: self.dry_run,
            ..CycleSummary::default()
        };

        if report.plan.is_empty() {
            tracing::debug!(
                desired = summary.desired,
                managed = summary.managed,
                "Aliases already in sync"
            );
            return Ok(summary);
        }

        if self.dry_run {
            for operation in &report.plan {
                tracing::info!(
                    dry_run = true,
                    "[{}] alias: {}",
                    operation.kind(),
                    operation.alias().key()
                );
            }
            return Ok(summary);
        }

        let execution = execute_plan(self.store.as_ref(), &report.plan, &override_id).await;
        summary.created = execution.created();
        summary.deleted = execution.deleted();
        summary.failed = execution.failed();

        if execution.is_success() {
            Ok(summary)
        } else {
            Err(SyncError::Partial {
                failed: summary.failed,
                attempted: summary.planned,
            })
        }
    }
}
