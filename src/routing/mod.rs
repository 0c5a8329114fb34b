//! Router rule subsystem.
//!
//! # Data Flow
//! ```text
//! Router rule string
//!     → parser.rs (tokenize, precedence parse → Expr)
//!     → tree.rs (push negation to leaves → PredicateTree)
//!     → extract.rs (collect host leaves, dedupe, apply exclusions)
//!     → Vec<DomainCandidate> (literal or pattern)
//! ```
//!
//! # Design Decisions
//! - Trees are rebuilt from the latest rule every cycle, never cached
//! - Negation push-down is a pure transform, no tree mutation
//! - Malformed rules are an error value the caller reports per router

pub mod extract;
pub mod matcher;
pub mod parser;
pub mod tree;

pub use extract::extract_candidates;
pub use matcher::{DomainCandidate, DomainKind, Matcher};
pub use parser::{parse_rule, Expr, RuleError};
pub use tree::PredicateTree;
