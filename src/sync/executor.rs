//! Plan execution.
//!
//! # Responsibilities
//! - Apply operations one at a time, in plan order
//! - Record a per-operation outcome instead of stopping on failure
//! - Apply pending changes once if anything succeeded
//!
//! # Design Decisions
//! - Sequential on purpose: no concurrent calls against the store
//! - No rollback; a partial plan stays partially applied

use crate::observability::metrics;
use crate::opnsense::{AliasStore, StoreError};
use crate::sync::types::{OpKind, Operation, Plan};

/// Result of one operation.
#[derive(Debug)]
pub struct OperationOutcome {
    pub operation: Operation,
    pub result: Result<(), StoreError>,
}

/// Everything that happened while applying a plan.
#[derive(Debug, Default)]
pub struct ExecutionReport {
    pub outcomes: Vec<OperationOutcome>,
    /// Outcome of the apply call; `None` when it was not needed.
    pub applied: Option<Result<(), StoreError>>,
}

impl ExecutionReport {
    fn count(&self, kind: OpKind) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.operation.kind() == kind && o.result.is_ok())
            .count()
    }

    pub fn created(&self) -> usize {
        self.count(OpKind::Create)
    }

    pub fn deleted(&self) -> usize {
        self.count(OpKind::Delete)
    }

    /// Failed operations, plus a failed apply.
    pub fn failed(&self) -> usize {
        let ops = self.outcomes.iter().filter(|o| o.result.is_err()).count();
        let apply = usize::from(matches!(self.applied, Some(Err(_))));
        ops + apply
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Apply `plan` against `store`, grouping new aliases under `override_id`.
pub async fn execute_plan(
    store: &dyn AliasStore,
    plan: &Plan,
    override_id: &str,
) -> ExecutionReport {
    let mut report = ExecutionReport::default();

    for operation in plan {
        let alias = operation.alias();
        let result = match operation {
            Operation::Create(alias) => store.create_alias(alias, override_id).await.map(|id| {
                tracing::info!(alias = %alias.key(), id = %id, "Created alias");
            }),
            Operation::Delete(alias) => store.delete_alias(alias).await.map(|()| {
                tracing::info!(alias = %alias.key(), "Deleted alias");
            }),
        };
        if let Err(e) = &result {
            tracing::error!(
                alias = %alias.key(),
                kind = %operation.kind(),
                error = %e,
                "Operation failed"
            );
        }
        metrics::record_operation(operation.kind(), result.is_ok());
        report.outcomes.push(OperationOutcome {
            operation: operation.clone(),
            result,
        });
    }

    let succeeded = report.created() + report.deleted();
    if succeeded > 0 {
        let applied = store.apply().await;
        match &applied {
            Ok(()) => tracing::info!(
                created = report.created(),
                deleted = report.deleted(),
                "Applied changes to OPNsense Unbound"
            ),
            Err(e) => tracing::error!(error = %e, "Failed to apply changes"),
        }
        report.applied = Some(applied);
    }

    report
}
