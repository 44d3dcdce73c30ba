//! Decoding of recorded Log Analytics responses.
//!
//! Accepts the REST wire shape
//! `{"tables":[{"name":..,"columns":[{"name":..,"type":..}],"rows":[[..]]}]}`
//! and turns each JSON cell into a typed [`Value`] using its column type.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{ColumnInfo, QueryResponse, Row, TabularResult, Value};
use crate::error::{LensError, Result};

#[derive(Debug, Deserialize)]
struct RawResponse {
    #[serde(default)]
    tables: Vec<RawTable>,
}

#[derive(Debug, Deserialize)]
struct RawTable {
    #[serde(default)]
    name: String,
    columns: Vec<ColumnInfo>,
    #[serde(default)]
    rows: Vec<Vec<serde_json::Value>>,
}

impl QueryResponse {
    /// Parses a recorded response.
    ///
    /// Cells beyond the declared columns are decoded by their JSON shape so
    /// that width mismatches survive decoding and surface in the normalizer.
    pub fn from_json(text: &str) -> Result<Self> {
        let raw: RawResponse = serde_json::from_str(text)
            .map_err(|e| LensError::backend(format!("Invalid response JSON: {e}")))?;

        let tables = raw
            .tables
            .into_iter()
            .map(decode_table)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { tables })
    }
}

fn decode_table(raw: RawTable) -> Result<TabularResult> {
    let rows = raw
        .rows
        .into_iter()
        .enumerate()
        .map(|(row_index, cells)| decode_row(&raw.columns, row_index, cells))
        .collect::<Result<Vec<_>>>()?;

    Ok(TabularResult {
        name: raw.name,
        columns: raw.columns,
        rows,
    })
}

fn decode_row(columns: &[ColumnInfo], row_index: usize, cells: Vec<serde_json::Value>) -> Result<Row> {
    cells
        .into_iter()
        .enumerate()
        .map(|(i, cell)| match columns.get(i) {
            Some(column) => decode_cell(&column.data_type, cell).map_err(|reason| {
                LensError::formatting(format!(
                    "row {row_index}, column '{}': {reason}",
                    column.name
                ))
            }),
            None => Ok(infer_value(cell)),
        })
        .collect()
}

/// Decodes one cell according to its Kusto column type.
fn decode_cell(data_type: &str, cell: serde_json::Value) -> std::result::Result<Value, String> {
    use serde_json::Value as Json;

    if cell.is_null() {
        return Ok(Value::Null);
    }

    match data_type.to_ascii_lowercase().as_str() {
        "datetime" | "date" => match &cell {
            Json::String(s) => DateTime::parse_from_rfc3339(s)
                .map(|ts| Value::Timestamp(ts.with_timezone(&Utc)))
                .map_err(|e| format!("invalid datetime '{s}': {e}")),
            other => Err(format!("expected datetime string, got {other}")),
        },
        "bool" | "boolean" => match &cell {
            Json::Bool(b) => Ok(Value::Bool(*b)),
            Json::Number(n) if n.as_i64() == Some(0) => Ok(Value::Bool(false)),
            Json::Number(n) if n.as_i64() == Some(1) => Ok(Value::Bool(true)),
            other => Err(format!("expected boolean, got {other}")),
        },
        "int" | "long" => match &cell {
            Json::Number(n) => n
                .as_i64()
                .map(Value::Int)
                .ok_or_else(|| format!("expected integer, got {n}")),
            other => Err(format!("expected integer, got {other}")),
        },
        "real" | "double" | "decimal" => match &cell {
            Json::Number(n) => n
                .as_f64()
                .map(Value::Float)
                .ok_or_else(|| format!("expected number, got {n}")),
            Json::String(s) => s
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| format!("expected number, got '{s}'")),
            other => Err(format!("expected number, got {other}")),
        },
        // Dynamic columns usually arrive as JSON-encoded strings.
        "dynamic" => match cell {
            Json::String(s) => match serde_json::from_str::<Json>(&s) {
                Ok(parsed @ (Json::Object(_) | Json::Array(_))) => Ok(Value::Dynamic(parsed)),
                _ => Ok(Value::String(s)),
            },
            other => Ok(Value::Dynamic(other)),
        },
        _ => Ok(infer_value(cell)),
    }
}

/// Maps a JSON cell to the closest value without a declared type.
fn infer_value(cell: serde_json::Value) -> Value {
    use serde_json::Value as Json;

    match cell {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
        },
        Json::String(s) => Value::String(s),
        other => Value::Dynamic(other),
    }
}
