//! Query tool integration tests.
//!
//! Runs the full optimize → backend → normalize pipeline against mock and
//! replay backends.

use super::fixture;
use kql_lens::backend::{MockBackend, ReplayBackend};
use kql_lens::config::Config;
use kql_lens::result::{ColumnInfo, QueryResponse, TabularResult, Value};
use kql_lens::tool::KqlQueryTool;

#[tokio::test]
async fn test_replay_pipeline_with_default_config() {
    let tool = KqlQueryTool::from_config(
        &Config::default(),
        ReplayBackend::new(fixture("requests_response.json")),
    )
    .unwrap();

    let out = tool
        .run("requests | where success == false", "/subscriptions/abc")
        .await;

    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 3);
    assert_eq!(parsed[0]["timestamp"], "2024-01-01T00:00:00+00:00");
}

#[tokio::test]
async fn test_config_drives_catalog_and_lookback() {
    let config: Config = toml::from_str(
        r#"
[backend]
timespan_days = 2

[[tables]]
name = "AppTraces"
columns = ["TimeGenerated", "Message"]
"#,
    )
    .unwrap();

    let tool = KqlQueryTool::from_config(&config, MockBackend::new()).unwrap();
    let out = tool.run("AppTraces | take 5", "res").await;
    assert_eq!(out, "No data returned from query");

    let requests = tool.backend().requests().await;
    assert_eq!(requests[0].query, "AppTraces | take 5 | project TimeGenerated, Message");
    assert_eq!(requests[0].timespan_days(), 2);
}

#[tokio::test]
async fn test_large_result_is_summarized_through_tool() {
    let rows = (0..42)
        .map(|i| vec![Value::Int(i), Value::from(format!("msg {i}"))])
        .collect();
    let table = TabularResult::with_data(
        vec![ColumnInfo::new("itemCount", "long"), ColumnInfo::new("message", "string")],
        rows,
    );
    let tool = KqlQueryTool::from_config(
        &Config::default(),
        MockBackend::with_response(QueryResponse::single(table)),
    )
    .unwrap();

    let out = tool.run("traces", "res").await;
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["total_count"], 42);
    assert_eq!(parsed["sample_entries"].as_array().unwrap().len(), 5);
    assert_eq!(parsed["summary"], "Found 42 entries. Showing first 5 as sample.");
}

#[test]
fn test_invoke_with_missing_recording_returns_diagnostic() {
    let tool = KqlQueryTool::from_config(
        &Config::default(),
        ReplayBackend::new(fixture("does_not_exist.json")),
    )
    .unwrap();

    let out = tokio_test::block_on(tool.invoke(&serde_json::json!({
        "query": "exceptions | take 1",
        "resource_id": "res"
    })));

    assert!(out.starts_with("Error executing KQL query: Backend error: Failed to read recorded response"));
}
