//! Keyword-based query matching.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use super::QueryMatcher;
use crate::catalog::{TableCatalog, TableEntry};

static UNION_ALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bunion\s+\*").expect("valid union-all pattern"));

static UNION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bunion\b").expect("valid union pattern"));

/// Matches operators and table names by ASCII case-insensitive text search.
///
/// `union` must stand alone as a word. `project` and table names are plain
/// substring matches, so `projection_count` suppresses rewriting and a table
/// named `requests` also matches inside `myrequests`.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordMatcher;

impl KeywordMatcher {
    /// Creates a new keyword matcher.
    pub fn new() -> Self {
        Self
    }
}

impl QueryMatcher for KeywordMatcher {
    fn find_union_all(&self, query: &str) -> Option<Range<usize>> {
        UNION_ALL.find(query).map(|m| m.range())
    }

    fn has_union(&self, query: &str) -> bool {
        UNION.is_match(query)
    }

    fn split_union<'q>(&self, query: &'q str) -> Vec<&'q str> {
        UNION.split(query).collect()
    }

    fn has_projection(&self, text: &str) -> bool {
        text.to_ascii_lowercase().contains("project")
    }

    fn match_table<'c>(&self, text: &str, catalog: &'c TableCatalog) -> Option<&'c TableEntry> {
        let lower = text.to_ascii_lowercase();
        catalog
            .iter()
            .find(|entry| lower.contains(&entry.name.to_ascii_lowercase()))
    }
}
