//! Reconciliation data types.

use std::fmt;

use crate::domains::MaterializeError;
use crate::routing::RuleError;

/// A DNS override alias in the alias store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostAlias {
    /// Store-assigned handle; `None` until the alias is created.
    pub id: Option<String>,
    pub hostname: String,
    pub domain: String,
    pub description: String,
}

impl HostAlias {
    pub fn new(
        hostname: impl Into<String>,
        domain: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            hostname: hostname.into(),
            domain: domain.into(),
            description: description.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Reconciliation identity: `hostname.domain`.
    pub fn key(&self) -> String {
        format!("{}.{}", self.hostname, self.domain)
    }
}

/// Operation kind, used for logs and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OpKind {
    Delete,
    Create,
}

impl OpKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            OpKind::Delete => "delete",
            OpKind::Create => "create",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpKind::Delete => f.write_str("DELETE"),
            OpKind::Create => f.write_str("CREATE"),
        }
    }
}

/// A single change to the alias store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Create(HostAlias),
    Delete(HostAlias),
}

impl Operation {
    pub fn kind(&self) -> OpKind {
        match self {
            Operation::Create(_) => OpKind::Create,
            Operation::Delete(_) => OpKind::Delete,
        }
    }

    pub fn alias(&self) -> &HostAlias {
        match self {
            Operation::Create(alias) | Operation::Delete(alias) => alias,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.alias().key())
    }
}

/// Ordered operations that bring the store in line with the routers.
///
/// Empty means converged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub operations: Vec<Operation>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.operations.iter()
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}

/// A router input that contributed less than it should have.
#[derive(Debug)]
pub enum PlanIssue {
    /// The router's rule did not parse; it contributed nothing.
    RuleParse { router: String, error: RuleError },
    /// A candidate of the router produced no hostname.
    Materialize {
        router: String,
        error: MaterializeError,
    },
}

impl PlanIssue {
    pub fn router(&self) -> &str {
        match self {
            PlanIssue::RuleParse { router, .. } | PlanIssue::Materialize { router, .. } => router,
        }
    }
}

impl fmt::Display for PlanIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanIssue::RuleParse { router, error } => {
                write!(f, "router {router}: invalid rule: {error}")
            }
            PlanIssue::Materialize { router, error } => write!(f, "router {router}: {error}"),
        }
    }
}

/// A computed plan together with what was skipped along the way.
#[derive(Debug, Default)]
pub struct PlanReport {
    pub plan: Plan,
    pub issues: Vec<PlanIssue>,
    /// Distinct desired alias keys.
    pub desired: usize,
    /// Aliases carrying the description marker.
    pub managed: usize,
}
