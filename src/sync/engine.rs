//! Plan computation.
//!
//! # Responsibilities
//! - Select routers through the [`RouterFilter`]
//! - Derive the desired alias set from router rules
//! - Derive the managed alias set from the store snapshot
//! - Diff the two into an ordered [`Plan`]
//!
//! # Design Decisions
//! - Identity is `hostname.domain`; there is no update operation
//! - Only aliases whose description equals the marker are ever touched
//! - Deletes sort before creates, each by case-insensitive key

use std::collections::BTreeMap;

use crate::domains::{DomainMaterializer, MaterializeError};
use crate::observability::metrics;
use crate::routing::extract_candidates;
use crate::sync::filter::RouterFilter;
use crate::sync::types::{HostAlias, Operation, Plan, PlanIssue, PlanReport};
use crate::traefik::Router;

/// Turns router and alias snapshots into a plan.
pub struct SyncEngine {
    filter: RouterFilter,
    materializer: DomainMaterializer,
    description: String,
}

impl SyncEngine {
    pub fn new(
        filter: RouterFilter,
        materializer: DomainMaterializer,
        description: impl Into<String>,
    ) -> Self {
        Self {
            filter,
            materializer,
            description: description.into(),
        }
    }

    /// Compute the operations that converge `aliases` onto `routers`.
    pub async fn compute_plan(&mut self, routers: &[Router], aliases: &[HostAlias]) -> PlanReport {
        let mut issues = Vec::new();
        let desired = self.desired_aliases(routers, &mut issues).await;
        let current = self.managed_aliases(aliases);

        let plan = diff(&desired, &current);
        metrics::record_plan(desired.len(), current.len(), plan.len());

        PlanReport {
            plan,
            issues,
            desired: desired.len(),
            managed: current.len(),
        }
    }

    async fn desired_aliases(
        &mut self,
        routers: &[Router],
        issues: &mut Vec<PlanIssue>,
    ) -> BTreeMap<String, HostAlias> {
        let mut desired = BTreeMap::new();

        for router in routers.iter().filter(|r| self.filter.accepts(r)) {
            let candidates = match extract_candidates(&router.rule) {
                Ok(candidates) => candidates,
                Err(error) => {
                    tracing::warn!(
                        router = %router.name,
                        rule = %router.rule,
                        error = %error,
                        "Failed to parse router rule, router contributes no aliases"
                    );
                    metrics::record_rule_parse_failure();
                    issues.push(PlanIssue::RuleParse {
                        router: router.name.clone(),
                        error,
                    });
                    continue;
                }
            };

            for candidate in &candidates {
                let materialized = self.materializer.materialize(candidate).await;
                for error in materialized.errors {
                    tracing::warn!(
                        router = %router.name,
                        candidate = %candidate.value,
                        error = %error,
                        "Skipping domain candidate"
                    );
                    if matches!(error, MaterializeError::Generation { .. }) {
                        metrics::record_generation_failure();
                    }
                    issues.push(PlanIssue::Materialize {
                        router: router.name.clone(),
                        error,
                    });
                }
                for host in materialized.hosts {
                    let alias =
                        HostAlias::new(host.hostname, host.domain, self.description.as_str());
                    let key = alias.key();
                    if desired.insert(key.clone(), alias).is_some() {
                        tracing::debug!(
                            router = %router.name,
                            alias = %key,
                            "Alias already desired by an earlier router, keeping the latest"
                        );
                    }
                }
            }
        }

        desired
    }

    fn managed_aliases(&self, aliases: &[HostAlias]) -> BTreeMap<String, HostAlias> {
        aliases
            .iter()
            .filter(|alias| alias.description == self.description)
            .map(|alias| (alias.key(), alias.clone()))
            .collect()
    }
}

/// Diff desired against managed aliases into an ordered plan.
///
/// Keys present on both sides produce nothing, whatever their other fields.
pub fn diff(desired: &BTreeMap<String, HostAlias>, current: &BTreeMap<String, HostAlias>) -> Plan {
    let deletes = current
        .iter()
        .filter(|(key, _)| !desired.contains_key(*key))
        .map(|(_, alias)| Operation::Delete(alias.clone()));
    let creates = desired
        .iter()
        .filter(|(key, _)| !current.contains_key(*key))
        .map(|(_, alias)| Operation::Create(alias.clone()));

    let mut operations: Vec<Operation> = deletes.chain(creates).collect();
    operations.sort_by_cached_key(|op| (op.kind(), op.alias().key().to_lowercase()));
    Plan { operations }
}
