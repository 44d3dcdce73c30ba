//! Query rewriting module.
//!
//! Rewrites KQL queries so the analytics backend only returns the columns
//! listed in the table catalog. Rewriting is keyword based, not a parse:
//! the [`QueryMatcher`] trait isolates every textual decision so a real
//! parser can be substituted later.

mod matcher;
mod optimizer;

pub use matcher::KeywordMatcher;
pub use optimizer::{optimize_query, QueryOptimizer};

use crate::catalog::{TableCatalog, TableEntry};
use std::fmt;
use std::ops::Range;

/// Which rewrite branch produced a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RewriteKind {
    /// `union *` expanded into one projected fragment per catalog table.
    UnionAll,
    /// A single table query received a trailing `| project`.
    SingleTable,
    /// An explicit union had its table fragments projected individually.
    Union,
    /// No rule applied; the query is returned as-is.
    Unchanged,
}

impl RewriteKind {
    /// Returns true if the query text was modified.
    pub fn is_rewritten(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

impl fmt::Display for RewriteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnionAll => write!(f, "union-all expansion"),
            Self::SingleTable => write!(f, "single-table projection"),
            Self::Union => write!(f, "union projection"),
            Self::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// A rewritten query together with the branch that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    /// The query to send to the backend.
    pub query: String,
    /// The rule that was applied.
    pub kind: RewriteKind,
}

impl Rewrite {
    /// Creates a new rewrite result.
    pub fn new(query: impl Into<String>, kind: RewriteKind) -> Self {
        Self {
            query: query.into(),
            kind,
        }
    }
}

/// Textual recognizer used by the optimizer.
///
/// All offsets are byte offsets into the text that was passed in.
pub trait QueryMatcher: Send + Sync {
    /// Byte range of the first `union *` operator, if any.
    fn find_union_all(&self, query: &str) -> Option<Range<usize>>;

    /// Returns true if the query contains a `union` operator.
    fn has_union(&self, query: &str) -> bool;

    /// Splits the query on every `union` operator. Fragments are untrimmed
    /// and may be empty.
    fn split_union<'q>(&self, query: &'q str) -> Vec<&'q str>;

    /// Returns true if the text already projects columns.
    fn has_projection(&self, text: &str) -> bool;

    /// The first catalog entry (in catalog order) whose table the text references.
    fn match_table<'c>(&self, text: &str, catalog: &'c TableCatalog) -> Option<&'c TableEntry>;
}
