//! Table catalog for query rewriting.
//!
//! Maps each telemetry table to the ordered list of columns considered
//! essential for diagnostics. The catalog is validated once at construction
//! and never mutated afterwards.

use crate::error::{LensError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single catalog entry: a table and its essential columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableEntry {
    /// Table name, with the casing used when emitting queries.
    pub name: String,

    /// Essential columns, in projection order.
    pub columns: Vec<String>,
}

impl TableEntry {
    /// Creates a new table entry.
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the projection list, e.g. `timestamp, operation_Id, name`.
    pub fn projection(&self) -> String {
        self.columns.join(", ")
    }
}

/// Immutable table → essential-columns lookup.
///
/// Iteration follows insertion order. Name lookup is ASCII case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCatalog {
    entries: Vec<TableEntry>,
    index: HashMap<String, usize>,
}

impl TableCatalog {
    /// Builds a catalog, rejecting an empty list, empty names, duplicate
    /// names and empty column lists.
    ///
    /// Surrounding whitespace is stripped from table and column names.
    pub fn new(mut entries: Vec<TableEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(LensError::config("table catalog has no tables"));
        }

        let mut index = HashMap::with_capacity(entries.len());

        for (position, entry) in entries.iter_mut().enumerate() {
            entry.name = entry.name.trim().to_string();
            for column in &mut entry.columns {
                *column = column.trim().to_string();
            }

            if entry.name.is_empty() {
                return Err(LensError::config(format!(
                    "table #{} in catalog has an empty name",
                    position + 1
                )));
            }
            if entry.columns.is_empty() {
                return Err(LensError::config(format!(
                    "table '{}' has no essential columns",
                    entry.name
                )));
            }
            if entry.columns.iter().any(String::is_empty) {
                return Err(LensError::config(format!(
                    "table '{}' has an empty column name",
                    entry.name
                )));
            }
            if index.insert(entry.name.to_ascii_lowercase(), position).is_some() {
                return Err(LensError::config(format!(
                    "duplicate table '{}' in catalog",
                    entry.name
                )));
            }
        }

        Ok(Self { entries, index })
    }

    /// The Application Insights tables and their diagnostic columns.
    pub fn application_insights() -> Self {
        let entries = vec![
            TableEntry::new(
                "traces",
                ["timestamp", "operation_Id", "operation_ParentId", "message", "severityLevel"],
            ),
            TableEntry::new(
                "requests",
                ["timestamp", "operation_Id", "operation_ParentId", "name", "success", "duration"],
            ),
            TableEntry::new(
                "exceptions",
                ["timestamp", "operation_Id", "operation_ParentId", "type", "message", "outerMessage"],
            ),
            TableEntry::new(
                "customEvents",
                ["timestamp", "operation_Id", "operation_ParentId", "name"],
            ),
            TableEntry::new(
                "dependencies",
                ["timestamp", "operation_Id", "operation_ParentId", "name", "type", "success"],
            ),
            TableEntry::new(
                "pageViews",
                ["timestamp", "operation_Id", "operation_ParentId", "name", "duration"],
            ),
            TableEntry::new(
                "customMetrics",
                ["timestamp", "operation_Id", "operation_ParentId", "name", "value"],
            ),
        ];

        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name.to_ascii_lowercase(), i))
            .collect();

        Self { entries, index }
    }

    /// Looks up a table by name, ignoring ASCII case.
    pub fn get(&self, name: &str) -> Option<&TableEntry> {
        self.index
            .get(&name.trim().to_ascii_lowercase())
            .map(|&i| &self.entries[i])
    }

    /// Iterates entries in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &TableEntry> {
        self.entries.iter()
    }

    /// Returns the entries as a slice.
    pub fn entries(&self) -> &[TableEntry] {
        &self.entries
    }

    /// Number of tables in the catalog.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the catalog holds no tables.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Formats the catalog as one `table: columns` line per entry.
    pub fn describe(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{}: {}", e.name, e.projection()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for TableCatalog {
    fn default() -> Self {
        Self::application_insights()
    }
}

impl<'a> IntoIterator for &'a TableCatalog {
    type Item = &'a TableEntry;
    type IntoIter = std::slice::Iter<'a, TableEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
