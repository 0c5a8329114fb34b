//! Recognized rule matchers.
//!
//! # Responsibilities
//! - Enumerate the predicate functions a router rule may call
//! - Resolve function names case-insensitively
//! - Classify which matchers select hosts
//!
//! # Design Decisions
//! - Only `Host` and `HostRegexp` contribute hostnames
//! - Every other matcher still parses so AND/OR structure stays intact
//! - Unknown function names are a parse failure, not an inert leaf

use std::fmt;

/// A predicate function that may appear in a router rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Matcher {
    ClientIp,
    Method,
    Host,
    HostRegexp,
    Path,
    PathRegexp,
    PathPrefix,
    Header,
    HeaderRegexp,
    Query,
    QueryRegexp,
    Headers,
    HeadersRegexp,
}

impl Matcher {
    /// Every matcher the rule parser accepts.
    pub const ALL: [Matcher; 13] = [
        Matcher::ClientIp,
        Matcher::Method,
        Matcher::Host,
        Matcher::HostRegexp,
        Matcher::Path,
        Matcher::PathRegexp,
        Matcher::PathPrefix,
        Matcher::Header,
        Matcher::HeaderRegexp,
        Matcher::Query,
        Matcher::QueryRegexp,
        Matcher::Headers,
        Matcher::HeadersRegexp,
    ];

    /// Canonical function name as written in Traefik rules.
    pub const fn name(self) -> &'static str {
        match self {
            Matcher::ClientIp => "ClientIP",
            Matcher::Method => "Method",
            Matcher::Host => "Host",
            Matcher::HostRegexp => "HostRegexp",
            Matcher::Path => "Path",
            Matcher::PathRegexp => "PathRegexp",
            Matcher::PathPrefix => "PathPrefix",
            Matcher::Header => "Header",
            Matcher::HeaderRegexp => "HeaderRegexp",
            Matcher::Query => "Query",
            Matcher::QueryRegexp => "QueryRegexp",
            Matcher::Headers => "Headers",
            Matcher::HeadersRegexp => "HeadersRegexp",
        }
    }

    /// Look up a matcher by function name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(name))
    }

    /// Returns the candidate kind this matcher produces, if it selects hosts.
    pub const fn domain_kind(self) -> Option<DomainKind> {
        match self {
            Matcher::Host => Some(DomainKind::Literal),
            Matcher::HostRegexp => Some(DomainKind::Pattern),
            _ => None,
        }
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a domain candidate must be treated downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomainKind {
    /// An exact hostname.
    Literal,
    /// A regular expression that must be expanded into hostnames.
    Pattern,
}

/// A hostname value extracted from a rule.
///
/// Values are lower-cased at extraction time, hosts match case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomainCandidate {
    pub value: String,
    pub kind: DomainKind,
}

impl DomainCandidate {
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: DomainKind::Literal,
        }
    }

    pub fn pattern(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: DomainKind::Pattern,
        }
    }
}
