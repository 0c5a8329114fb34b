//! Domain candidate extraction from router rules.

use std::collections::{HashMap, HashSet};

use crate::routing::matcher::{DomainCandidate, DomainKind};
use crate::routing::parser::{parse_rule, RuleError};
use crate::routing::tree::PredicateTree;

/// Extract the host candidates a rule can match.
///
/// Values are de-duplicated in first-seen order. A value seen as both
/// `Host` and `HostRegexp` is a pattern. Values named by a negated host
/// matcher are dropped by exact string comparison.
pub fn extract_candidates(rule: &str) -> Result<Vec<DomainCandidate>, RuleError> {
    let tree = PredicateTree::from_expr(&parse_rule(rule)?);
    let matches = tree.host_matches();

    let mut order: Vec<String> = Vec::with_capacity(matches.positive.len());
    let mut kinds: HashMap<String, DomainKind> = HashMap::with_capacity(matches.positive.len());
    for candidate in matches.positive {
        match kinds.get_mut(&candidate.value) {
            Some(kind) => {
                if candidate.kind == DomainKind::Pattern {
                    *kind = DomainKind::Pattern;
                }
            }
            None => {
                kinds.insert(candidate.value.clone(), candidate.kind);
                order.push(candidate.value);
            }
        }
    }

    let excluded: HashSet<String> = matches.negative.into_iter().collect();
    Ok(order
        .into_iter()
        .filter(|value| !excluded.contains(value))
        .map(|value| {
            let kind = kinds[&value];
            DomainCandidate { value, kind }
        })
        .collect())
}
