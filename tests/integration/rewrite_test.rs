//! Query rewriting integration tests.
//!
//! Checks the rewrite rules against the Application Insights catalog and
//! against small synthetic catalogs.

use kql_lens::catalog::{TableCatalog, TableEntry};
use kql_lens::rewrite::{optimize_query, QueryOptimizer, RewriteKind};
use pretty_assertions::assert_eq;

fn app_insights() -> QueryOptimizer {
    QueryOptimizer::new(TableCatalog::application_insights())
}

#[test]
fn test_failed_requests_get_projected() {
    let catalog = TableCatalog::new(vec![TableEntry::new(
        "requests",
        ["timestamp", "operation_Id", "operation_ParentId", "name", "success", "duration"],
    )])
    .unwrap();

    assert_eq!(
        optimize_query("requests | where success == false", &catalog),
        "requests | where success == false | project timestamp, operation_Id, operation_ParentId, name, success, duration"
    );
}

#[test]
fn test_union_all_over_two_tables() {
    let catalog = TableCatalog::new(vec![
        TableEntry::new("A", ["c1"]),
        TableEntry::new("B", ["c2"]),
    ])
    .unwrap();

    assert_eq!(
        optimize_query("union * | where timestamp > ago(1d)", &catalog),
        "union (A | project c1),(B | project c2) | where timestamp > ago(1d)"
    );
}

#[test]
fn test_union_all_over_reference_catalog() {
    let optimizer = app_insights();
    let rewrite = optimizer.rewrite("union * | where operation_Id == '4bf92f3577b34da6'");

    assert_eq!(rewrite.kind, RewriteKind::UnionAll);
    assert!(rewrite.query.starts_with(
        "union (traces | project timestamp, operation_Id, operation_ParentId, message, severityLevel),"
    ));
    assert!(rewrite
        .query
        .ends_with("(customMetrics | project timestamp, operation_Id, operation_ParentId, name, value) | where operation_Id == '4bf92f3577b34da6'"));

    let fragments = rewrite.query.matches("| project").count();
    assert_eq!(fragments, 7);
}

#[test]
fn test_every_reference_table_is_projected_alone() {
    let optimizer = app_insights();
    for entry in optimizer.catalog() {
        let query = format!("{} | take 10", entry.name);
        let out = optimizer.optimize(&query);
        assert_eq!(out, format!("{query} | project {}", entry.projection()));
    }
}

#[test]
fn test_existing_projection_is_never_doubled() {
    let optimizer = app_insights();
    let queries = [
        "traces | project message",
        "requests | summarize count() by name | project name",
        "exceptions | project-away details",
    ];
    for query in queries {
        assert_eq!(optimizer.optimize(query), query);
    }
}

#[test]
fn test_rewrite_is_stable_on_its_own_output() {
    let optimizer = app_insights();
    let queries = [
        "dependencies | where success == false",
        "pageViews | summarize avg(duration) by name",
        "heartbeat | take 1",
        "traces | where message has 'timeout' union exceptions",
    ];
    for query in queries {
        let once = optimizer.optimize(query);
        assert_eq!(optimizer.optimize(&once), once, "second pass changed {query}");
    }
}

#[test]
fn test_explicit_union_keeps_segment_count() {
    let optimizer = app_insights();
    let query = "requests | where success == false union exceptions union customEvents | where name == 'Checkout'";
    let out = optimizer.optimize(query);

    let segments: Vec<_> = out.split("\nunion\n").collect();
    assert_eq!(segments.len(), 3);
    assert_eq!(
        segments[0],
        "(requests | where success == false | project timestamp, operation_Id, operation_ParentId, name, success, duration)"
    );
    assert_eq!(
        segments[1],
        "(exceptions | project timestamp, operation_Id, operation_ParentId, type, message, outerMessage)"
    );
    assert_eq!(
        segments[2],
        "(customEvents | where name == 'Checkout' | project timestamp, operation_Id, operation_ParentId, name)"
    );
}

#[test]
fn test_optimizer_shared_across_threads() {
    let optimizer = std::sync::Arc::new(app_insights());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let optimizer = optimizer.clone();
            std::thread::spawn(move || optimizer.optimize("traces | take 1"))
        })
        .collect();

    for handle in handles {
        assert_eq!(
            handle.join().unwrap(),
            "traces | take 1 | project timestamp, operation_Id, operation_ParentId, message, severityLevel"
        );
    }
}
