//! Projection-minimizing query rewriter.
//!
//! Applies the first matching rule of: `union *` expansion, single-table
//! projection, per-fragment union projection. Rewriting never fails; when no
//! rule applies the trimmed query is returned.

use tracing::debug;

use super::{KeywordMatcher, QueryMatcher, Rewrite, RewriteKind};
use crate::catalog::{TableCatalog, TableEntry};

/// Separator placed between union fragments.
const UNION_SEPARATOR: &str = "\nunion\n";

/// Query optimizer bound to a table catalog.
#[derive(Debug, Clone)]
pub struct QueryOptimizer<M = KeywordMatcher> {
    catalog: TableCatalog,
    matcher: M,
}

impl QueryOptimizer<KeywordMatcher> {
    /// Creates an optimizer using keyword matching.
    pub fn new(catalog: TableCatalog) -> Self {
        Self::with_matcher(catalog, KeywordMatcher::new())
    }
}

impl Default for QueryOptimizer<KeywordMatcher> {
    fn default() -> Self {
        Self::new(TableCatalog::application_insights())
    }
}

impl<M: QueryMatcher> QueryOptimizer<M> {
    /// Creates an optimizer with a custom matcher.
    pub fn with_matcher(catalog: TableCatalog, matcher: M) -> Self {
        Self { catalog, matcher }
    }

    /// The catalog this optimizer projects against.
    pub fn catalog(&self) -> &TableCatalog {
        &self.catalog
    }

    /// Rewrites a query, returning only the new text.
    pub fn optimize(&self, query: &str) -> String {
        self.rewrite(query).query
    }

    /// Rewrites a query and reports which rule was applied.
    pub fn rewrite(&self, query: &str) -> Rewrite {
        let query = query.trim();

        let rewrite = if let Some(range) = self.matcher.find_union_all(query) {
            Rewrite::new(
                self.expand_union_all(&query[range.end..]),
                RewriteKind::UnionAll,
            )
        } else if self.matcher.has_union(query) {
            self.project_union(query)
        } else {
            self.project_single_table(query)
        };

        debug!(kind = %rewrite.kind, query = %rewrite.query, "Rewrote KQL query");
        rewrite
    }

    /// `union *` → `union (t1 | project ...),(t2 | project ...) <modifiers>`.
    fn expand_union_all(&self, tail: &str) -> String {
        let modifiers = tail.trim();

        let capacity = self
            .catalog
            .iter()
            .map(|e| e.name.len() + e.columns.iter().map(|c| c.len() + 2).sum::<usize>() + 14)
            .sum::<usize>()
            + modifiers.len()
            + 8;
        let mut out = String::with_capacity(capacity);

        out.push_str("union ");
        for (i, entry) in self.catalog.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            push_projected(&mut out, entry.name.as_str(), entry);
        }

        if !modifiers.is_empty() {
            out.push(' ');
            out.push_str(modifiers);
        }

        out
    }

    fn project_single_table(&self, query: &str) -> Rewrite {
        if self.matcher.has_projection(query) {
            return Rewrite::new(query, RewriteKind::Unchanged);
        }

        match self.matcher.match_table(query, &self.catalog) {
            Some(entry) => Rewrite::new(
                format!("{query} | project {}", entry.projection()),
                RewriteKind::SingleTable,
            ),
            None => Rewrite::new(query, RewriteKind::Unchanged),
        }
    }

    fn project_union(&self, query: &str) -> Rewrite {
        let fragments = self.matcher.split_union(query);
        let leading_union = fragments.first().is_some_and(|f| f.trim().is_empty());

        let mut changed = false;
        let parts: Vec<String> = fragments
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .map(|fragment| {
                if self.matcher.has_projection(fragment) {
                    return fragment.to_string();
                }
                match self.matcher.match_table(fragment, &self.catalog) {
                    Some(entry) => {
                        changed = true;
                        let mut out = String::with_capacity(fragment.len() + 64);
                        push_projected(&mut out, fragment, entry);
                        out
                    }
                    None => fragment.to_string(),
                }
            })
            .collect();

        if !changed {
            return Rewrite::new(query, RewriteKind::Unchanged);
        }

        let mut out = parts.join(UNION_SEPARATOR);
        if leading_union {
            out.insert_str(0, "union\n");
        }
        Rewrite::new(out, RewriteKind::Union)
    }
}

/// Appends `(<source> | project <columns>)`.
fn push_projected(out: &mut String, source: &str, entry: &TableEntry) {
    out.push('(');
    out.push_str(source);
    out.push_str(" | project ");
    for (i, column) in entry.columns.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(column);
    }
    out.push(')');
}

/// Convenience function to optimize a query without keeping an optimizer around.
pub fn optimize_query(query: &str, catalog: &TableCatalog) -> String {
    QueryOptimizer::new(catalog.clone()).optimize(query)
}
