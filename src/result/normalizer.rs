//! Result normalization for token-constrained consumers.
//!
//! Converts a tabular response into flat records keyed by column name,
//! summarizing large result sets as a count plus a short sample.

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{iso8601, QueryResponse, Row, TabularResult, Value};
use crate::error::{LensError, Result};

/// Default number of rows above which a summary is returned.
pub const DEFAULT_SAMPLE_LIMIT: usize = 20;

/// Default number of rows kept in a summary sample.
pub const DEFAULT_SAMPLE_SIZE: usize = 5;

/// Size thresholds for summarization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// Results with more rows than this are summarized.
    #[serde(default = "default_sample_limit")]
    pub sample_limit: usize,

    /// Number of leading rows kept in a summary.
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
}

fn default_sample_limit() -> usize {
    DEFAULT_SAMPLE_LIMIT
}

fn default_sample_size() -> usize {
    DEFAULT_SAMPLE_SIZE
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            sample_limit: default_sample_limit(),
            sample_size: default_sample_size(),
        }
    }
}

impl NormalizerConfig {
    /// Checks that the thresholds describe a usable policy.
    pub fn validate(&self) -> Result<()> {
        if self.sample_limit == 0 {
            return Err(LensError::config("sample_limit must be at least 1"));
        }
        if self.sample_size == 0 || self.sample_size > self.sample_limit {
            return Err(LensError::config(format!(
                "sample_size must be between 1 and sample_limit ({}), got {}",
                self.sample_limit, self.sample_size
            )));
        }
        Ok(())
    }
}

/// A cell value as it appears in a normalized record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RecordValue {
    /// Missing cell, rendered as `null`.
    Null,

    /// Boolean cell.
    Bool(bool),

    /// Integer cell.
    Int(i64),

    /// Floating point cell. Non-finite values render as `null`.
    Float(f64),

    /// Text cell, including timestamps in ISO-8601 form.
    String(String),

    /// Structured `dynamic` cell, rendered as nested JSON.
    Dynamic(serde_json::Value),
}

impl From<&str> for RecordValue {
    fn from(v: &str) -> Self {
        RecordValue::String(v.to_string())
    }
}

/// One row keyed by column name, in column order.
///
/// Serializes as a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedRecord {
    fields: Vec<(String, RecordValue)>,
}

impl NormalizedRecord {
    /// Sets a field. A repeated column name overwrites the earlier value in place.
    pub fn insert(&mut self, column: impl Into<String>, value: RecordValue) {
        let column = column.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((column, value)),
        }
    }

    /// Looks up a field by column name.
    pub fn get(&self, column: &str) -> Option<&RecordValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Column names in record order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Iterates `(column, value)` pairs in record order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RecordValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for NormalizedRecord {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Count and leading sample of a result set too large to return in full.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSummary {
    /// Number of rows the backend returned.
    pub total_count: usize,

    /// The first rows, in backend order.
    pub sample_entries: Vec<NormalizedRecord>,

    /// Human-readable description of the summary.
    pub summary: String,
}

/// Why a result carried no rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoDataReason {
    /// The backend response contained no table at all.
    NoTables,
    /// The result table had zero rows.
    EmptyTable,
}

impl NoDataReason {
    /// Message shown in place of records.
    pub fn message(&self) -> &'static str {
        match self {
            Self::NoTables => "No data returned from query",
            Self::EmptyTable => "No data found in the specified time range",
        }
    }
}

/// Outcome of normalizing a response.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedOutput {
    /// Zero rows; not an error.
    NoData(NoDataReason),
    /// Every row, in backend order.
    Records(Vec<NormalizedRecord>),
    /// Too many rows; a count and sample instead.
    Summary(ResultSummary),
}

impl NormalizedOutput {
    /// Returns true for either no-data outcome.
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData(_))
    }

    /// Number of rows the backend returned.
    pub fn total_count(&self) -> usize {
        match self {
            Self::NoData(_) => 0,
            Self::Records(records) => records.len(),
            Self::Summary(summary) => summary.total_count,
        }
    }

    /// Renders the output for the caller: pretty JSON, or the no-data message.
    pub fn render(&self) -> Result<String> {
        let rendered = match self {
            Self::NoData(reason) => return Ok(reason.message().to_string()),
            Self::Records(records) => serde_json::to_string_pretty(records),
            Self::Summary(summary) => serde_json::to_string_pretty(summary),
        };
        rendered.map_err(|e| LensError::formatting(format!("Failed to serialize records: {e}")))
    }
}

/// Converts tabular responses into normalized records.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultNormalizer {
    config: NormalizerConfig,
}

impl ResultNormalizer {
    /// Creates a normalizer with the given thresholds.
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// The thresholds in use.
    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Normalizes the primary table of a backend response.
    pub fn normalize_response(&self, response: &QueryResponse) -> Result<NormalizedOutput> {
        match response.primary() {
            Some(table) => self.normalize_table(table),
            None => {
                warn!("Backend response contained no tables");
                Ok(NormalizedOutput::NoData(NoDataReason::NoTables))
            }
        }
    }

    /// Normalizes one result table.
    pub fn normalize_table(&self, table: &TabularResult) -> Result<NormalizedOutput> {
        self.normalize(&table.column_names(), &table.rows)
    }

    /// Normalizes rows against column names.
    ///
    /// Only the rows that end up in the output are converted, so width
    /// mismatches outside a summary sample go unnoticed.
    pub fn normalize<S: AsRef<str>>(&self, columns: &[S], rows: &[Row]) -> Result<NormalizedOutput> {
        if rows.is_empty() {
            warn!("Query returned no rows");
            return Ok(NormalizedOutput::NoData(NoDataReason::EmptyTable));
        }

        let total = rows.len();
        if total > self.config.sample_limit {
            let sample_len = self.config.sample_size.min(total);
            debug!(total, sample_len, "Summarizing large result set");

            let sample_entries = rows[..sample_len]
                .iter()
                .enumerate()
                .map(|(i, row)| normalize_row(columns, i, row))
                .collect::<Result<Vec<_>>>()?;

            return Ok(NormalizedOutput::Summary(ResultSummary {
                total_count: total,
                summary: format!(
                    "Found {total} entries. Showing first {} as sample.",
                    sample_entries.len()
                ),
                sample_entries,
            }));
        }

        let records = rows
            .iter()
            .enumerate()
            .map(|(i, row)| normalize_row(columns, i, row))
            .collect::<Result<Vec<_>>>()?;
        Ok(NormalizedOutput::Records(records))
    }
}

fn normalize_row<S: AsRef<str>>(columns: &[S], index: usize, row: &Row) -> Result<NormalizedRecord> {
    if row.len() != columns.len() {
        return Err(LensError::formatting(format!(
            "row {index} has {} cells but {} columns were returned",
            row.len(),
            columns.len()
        )));
    }

    let mut record = NormalizedRecord::default();
    for (column, value) in columns.iter().zip(row) {
        let column = column.as_ref();
        record.insert(column, normalize_value(column, value)?);
    }
    Ok(record)
}

/// Timestamps become ISO-8601 strings; everything else keeps its type.
fn normalize_value(column: &str, value: &Value) -> Result<RecordValue> {
    Ok(match value {
        Value::Null => RecordValue::Null,
        Value::Bool(b) => RecordValue::Bool(*b),
        Value::Int(i) => RecordValue::Int(*i),
        Value::Float(f) => RecordValue::Float(*f),
        Value::String(s) => RecordValue::String(s.clone()),
        Value::Timestamp(ts) => RecordValue::String(iso8601(ts)),
        Value::Dynamic(v) => RecordValue::Dynamic(v.clone()),
        Value::Bytes(b) => {
            return Err(LensError::formatting(format!(
                "column '{column}' holds {} bytes of binary data, which has no record form",
                b.len()
            )))
        }
    })
}
