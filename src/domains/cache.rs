//! Pattern expansion cache.

use std::collections::HashMap;

/// Expansion results keyed by raw pattern text.
///
/// Lives for the whole process and is never invalidated. Owned by a single
/// materializer and mutated through `&mut`, so it needs no lock while cycles
/// run one at a time.
#[derive(Debug, Default, Clone)]
pub struct ExpansionCache {
    entries: HashMap<String, Vec<String>>,
}

impl ExpansionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, pattern: &str) -> Option<&[String]> {
        self.entries.get(pattern).map(Vec::as_slice)
    }

    pub fn insert(&mut self, pattern: impl Into<String>, hosts: Vec<String>) {
        self.entries.insert(pattern.into(), hosts);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
