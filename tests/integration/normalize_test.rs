//! Result normalization integration tests.
//!
//! Decodes recorded responses and checks the normalized output.

use super::fixture;
use kql_lens::result::{
    NoDataReason, NormalizedOutput, NormalizerConfig, QueryResponse, RecordValue,
    ResultNormalizer,
};
use pretty_assertions::assert_eq;

fn load(name: &str) -> QueryResponse {
    let text = std::fs::read_to_string(fixture(name)).unwrap();
    QueryResponse::from_json(&text).unwrap()
}

/// A recorded response with `count` rows of `(timestamp, message)`.
fn traces_response(count: usize) -> QueryResponse {
    let rows: Vec<_> = (0..count)
        .map(|i| serde_json::json!([format!("2024-01-01T00:00:{:02}Z", i % 60), format!("tick {i}")]))
        .collect();
    let body = serde_json::json!({
        "tables": [{
            "name": "PrimaryResult",
            "columns": [
                {"name": "timestamp", "type": "datetime"},
                {"name": "message", "type": "string"}
            ],
            "rows": rows
        }]
    });
    QueryResponse::from_json(&body.to_string()).unwrap()
}

#[test]
fn test_small_result_returns_every_record() {
    let response = load("requests_response.json");
    let output = ResultNormalizer::default()
        .normalize_response(&response)
        .unwrap();

    let NormalizedOutput::Records(records) = &output else {
        panic!("Expected Records, got {:?}", output);
    };
    assert_eq!(records.len(), 3);

    let first = &records[0];
    assert_eq!(
        first.columns().collect::<Vec<_>>(),
        vec!["timestamp", "operation_Id", "operation_ParentId", "name", "success", "duration"]
    );
    assert_eq!(
        first.get("timestamp"),
        Some(&RecordValue::from("2024-01-01T00:00:00+00:00"))
    );
    assert_eq!(first.get("success"), Some(&RecordValue::Bool(false)));
    assert_eq!(first.get("duration"), Some(&RecordValue::Float(1532.7)));

    assert_eq!(
        records[1].get("timestamp"),
        Some(&RecordValue::from("2024-01-01T00:05:12.500+00:00"))
    );
}

#[test]
fn test_rendered_records_are_pretty_json_with_native_types() {
    let response = load("requests_response.json");
    let rendered = ResultNormalizer::default()
        .normalize_response(&response)
        .unwrap()
        .render()
        .unwrap();

    assert!(rendered.starts_with("[\n  {\n    \"timestamp\": \"2024-01-01T00:00:00+00:00\","));
    let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(parsed[2]["name"], "GET /api/orders");
    assert_eq!(parsed[2]["success"], false);
    assert_eq!(parsed[2]["duration"], 884.1);
}

#[test]
fn test_twenty_rows_are_not_summarized() {
    let output = ResultNormalizer::default()
        .normalize_response(&traces_response(20))
        .unwrap();
    match output {
        NormalizedOutput::Records(records) => assert_eq!(records.len(), 20),
        other => panic!("Expected Records, got {:?}", other),
    }
}

#[test]
fn test_twenty_one_rows_are_summarized() {
    let output = ResultNormalizer::default()
        .normalize_response(&traces_response(21))
        .unwrap();
    match output {
        NormalizedOutput::Summary(summary) => {
            assert_eq!(summary.total_count, 21);
            assert_eq!(summary.sample_entries.len(), 5);
            assert_eq!(
                summary.sample_entries[0].get("message"),
                Some(&RecordValue::from("tick 0"))
            );
            assert_eq!(summary.summary, "Found 21 entries. Showing first 5 as sample.");
        }
        other => panic!("Expected Summary, got {:?}", other),
    }
}

#[test]
fn test_configured_thresholds_apply() {
    let normalizer = ResultNormalizer::new(NormalizerConfig {
        sample_limit: 100,
        sample_size: 10,
    });
    assert_eq!(
        normalizer
            .normalize_response(&traces_response(60))
            .unwrap()
            .total_count(),
        60
    );

    match normalizer.normalize_response(&traces_response(150)).unwrap() {
        NormalizedOutput::Summary(summary) => assert_eq!(summary.sample_entries.len(), 10),
        other => panic!("Expected Summary, got {:?}", other),
    }
}

#[test]
fn test_no_data_outcomes_are_distinct() {
    let normalizer = ResultNormalizer::default();

    let no_tables = normalizer
        .normalize_response(&QueryResponse::from_json(r#"{"tables": []}"#).unwrap())
        .unwrap();
    let empty_table = normalizer.normalize_response(&traces_response(0)).unwrap();

    assert_eq!(no_tables, NormalizedOutput::NoData(NoDataReason::NoTables));
    assert_eq!(empty_table, NormalizedOutput::NoData(NoDataReason::EmptyTable));
    assert_eq!(no_tables.render().unwrap(), "No data returned from query");
    assert_eq!(
        empty_table.render().unwrap(),
        "No data found in the specified time range"
    );
}

#[test]
fn test_short_row_is_formatting_error() {
    let text = r#"{"tables":[{"name":"PrimaryResult","columns":[{"name":"a","type":"long"},{"name":"b","type":"long"}],"rows":[[1,2],[3]]}]}"#;
    let response = QueryResponse::from_json(text).unwrap();
    let err = ResultNormalizer::default()
        .normalize_response(&response)
        .unwrap_err();

    assert!(err.is_formatting());
    assert!(err.to_string().contains("row 1 has 1 cells but 2 columns"));
}
