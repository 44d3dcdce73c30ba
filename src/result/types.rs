//! Tabular response types.
//!
//! Defines the structures used to represent responses from the analytics backend.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A full backend response: zero or more result tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResponse {
    /// Result tables in backend order. Only the first one is normalized.
    pub tables: Vec<TabularResult>,
}

impl QueryResponse {
    /// Creates a response with no tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a response holding a single table.
    pub fn single(table: TabularResult) -> Self {
        Self {
            tables: vec![table],
        }
    }

    /// The primary result table, if the backend returned any.
    pub fn primary(&self) -> Option<&TabularResult> {
        self.tables.first()
    }
}

/// One result table: column metadata plus positionally aligned rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabularResult {
    /// Table name as reported by the backend (e.g. `PrimaryResult`).
    pub name: String,

    /// Column metadata for the result set.
    pub columns: Vec<ColumnInfo>,

    /// Rows of data.
    pub rows: Vec<Row>,
}

impl TabularResult {
    /// Creates a table with the given columns and rows.
    pub fn with_data(columns: Vec<ColumnInfo>, rows: Vec<Row>) -> Self {
        Self {
            name: "PrimaryResult".to_string(),
            columns,
            rows,
        }
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Metadata about a column in a result set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,

    /// Backend type name (`datetime`, `string`, `long`, ...).
    #[serde(rename = "type", default)]
    pub data_type: String,
}

impl ColumnInfo {
    /// Creates a new column info with the given name and type.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// A row of cells aligned with the table's columns.
pub type Row = Vec<Value>;

/// A single cell value from the analytics backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// NULL value.
    #[default]
    Null,

    /// Boolean value.
    Bool(bool),

    /// Signed integer (`int`, `long`).
    Int(i64),

    /// Floating point number (`real`, `decimal`).
    Float(f64),

    /// Text value (`string`, `guid`, `timespan`).
    String(String),

    /// Point in time (`datetime`).
    Timestamp(DateTime<Utc>),

    /// Structured value (`dynamic`), e.g. `customDimensions`.
    Dynamic(serde_json::Value),

    /// Binary payload from a backend that reports one. It has no record form.
    Bytes(Vec<u8>),
}

/// Canonical ISO-8601 form used in normalized output, e.g. `2024-01-01T00:00:00+00:00`.
pub fn iso8601(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}
