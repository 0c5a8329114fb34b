//! Negation-normal predicate trees.
//!
//! A [`PredicateTree`] is an [`Expr`] with every `!` pushed down to the
//! leaves (De Morgan), so combinators never carry a negation.

use crate::routing::matcher::{DomainCandidate, Matcher};
use crate::routing::parser::Expr;

/// A matcher call with its negation flag resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    pub matcher: Matcher,
    pub negated: bool,
    pub values: Vec<String>,
}

/// Boolean combination of matcher leaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredicateTree {
    And(Vec<PredicateTree>),
    Or(Vec<PredicateTree>),
    Leaf(Leaf),
}

/// Host values collected from a tree, before de-duplication.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HostMatches {
    /// Values of non-negated host leaves, in traversal order.
    pub positive: Vec<DomainCandidate>,
    /// Values of negated host leaves.
    pub negative: Vec<String>,
}

impl HostMatches {
    fn extend(&mut self, other: HostMatches) {
        self.positive.extend(other.positive);
        self.negative.extend(other.negative);
    }
}

impl PredicateTree {
    /// Build a negation-normal tree from a parsed expression.
    pub fn from_expr(expr: &Expr) -> Self {
        Self::lower(expr, false)
    }

    fn lower(expr: &Expr, negate: bool) -> Self {
        match expr {
            Expr::Call { matcher, args } => PredicateTree::Leaf(Leaf {
                matcher: *matcher,
                negated: negate,
                values: args.clone(),
            }),
            Expr::Not(inner) => Self::lower(inner, !negate),
            Expr::And(operands) => {
                let operands = Self::lower_all(operands, negate);
                if negate {
                    PredicateTree::Or(operands)
                } else {
                    PredicateTree::And(operands)
                }
            }
            Expr::Or(operands) => {
                let operands = Self::lower_all(operands, negate);
                if negate {
                    PredicateTree::And(operands)
                } else {
                    PredicateTree::Or(operands)
                }
            }
        }
    }

    fn lower_all(operands: &[Expr], negate: bool) -> Vec<Self> {
        operands.iter().map(|e| Self::lower(e, negate)).collect()
    }

    /// Collect the lower-cased arguments of every host leaf.
    ///
    /// AND and OR both flatten into the same lists.
    pub fn host_matches(&self) -> HostMatches {
        match self {
            PredicateTree::And(operands) | PredicateTree::Or(operands) => {
                let mut matches = HostMatches::default();
                for operand in operands {
                    matches.extend(operand.host_matches());
                }
                matches
            }
            PredicateTree::Leaf(leaf) => {
                let mut matches = HostMatches::default();
                let Some(kind) = leaf.matcher.domain_kind() else {
                    return matches;
                };
                let values = leaf.values.iter().map(|v| v.to_lowercase());
                if leaf.negated {
                    matches.negative.extend(values);
                } else {
                    matches
                        .positive
                        .extend(values.map(|value| DomainCandidate { value, kind }));
                }
                matches
            }
        }
    }
}
