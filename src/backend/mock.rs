//! Mock backend for testing.
//!
//! Returns a canned response and remembers every request it received.

use super::{QueryBackend, QueryRequest};
use crate::error::{LensError, Result};
use crate::result::QueryResponse;
use async_trait::async_trait;
use tokio::sync::Mutex;

/// A mock backend that returns a predefined response.
#[derive(Debug, Default)]
pub struct MockBackend {
    response: QueryResponse,
    failure: Option<String>,
    requests: Mutex<Vec<QueryRequest>>,
}

impl MockBackend {
    /// Creates a mock that returns a response with no tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock that returns the given response.
    pub fn with_response(response: QueryResponse) -> Self {
        Self {
            response,
            ..Self::default()
        }
    }

    /// Creates a mock whose every execution fails with the given message.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Requests received so far, oldest first.
    pub async fn requests(&self) -> Vec<QueryRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl QueryBackend for MockBackend {
    async fn execute(&self, request: &QueryRequest) -> Result<QueryResponse> {
        self.requests.lock().await.push(request.clone());

        match &self.failure {
            Some(message) => Err(LensError::backend(message.clone())),
            None => Ok(self.response.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{ColumnInfo, TabularResult, Value};

    #[tokio::test]
    async fn test_mock_returns_response_and_records_request() {
        let table = TabularResult::with_data(
            vec![ColumnInfo::new("message", "string")],
            vec![vec![Value::from("hello")]],
        );
        let backend = MockBackend::with_response(QueryResponse::single(table));
        let request = QueryRequest::new("res", "traces | take 1", 1);

        let response = backend.execute(&request).await.unwrap();
        assert_eq!(response.tables.len(), 1);
        assert_eq!(backend.requests().await, vec![request]);
    }

    #[tokio::test]
    async fn test_failing_mock() {
        let backend = MockBackend::failing("throttled");
        let err = backend
            .execute(&QueryRequest::new("res", "traces", 1))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Backend error: throttled");
    }
}
