//! Reconciliation subsystem.
//!
//! # Data Flow
//! ```text
//! scheduler.rs (tick, or shutdown)
//!     → runner.rs: resolve host override
//!         → fetch aliases ∥ fetch routers
//!         → engine.rs: filter.rs → routing → domains → desired set
//!                      description marker → managed set
//!                      diff + order → Plan
//!         → executor.rs: sequential create/delete → apply once
//!     → CycleSummary | SyncError
//! ```
//!
//! # Design Decisions
//! - One cycle at a time; the expansion cache is the only state kept
//!   between cycles
//! - Unmanaged aliases are invisible, never deleted
//! - Per-item failures are values in a report, never panics mid-batch

pub mod engine;
pub mod executor;
pub mod filter;
pub mod runner;
pub mod scheduler;
pub mod types;

pub use engine::{diff, SyncEngine};
pub use executor::{execute_plan, ExecutionReport, OperationOutcome};
pub use filter::RouterFilter;
pub use runner::{CycleSummary, SyncRunner};
pub use scheduler::Reconciler;
pub use types::{HostAlias, OpKind, Operation, Plan, PlanIssue, PlanReport};
