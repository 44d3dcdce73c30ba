//! Replay backend serving a recorded response from disk.

use super::{QueryBackend, QueryRequest};
use crate::error::{LensError, Result};
use crate::result::QueryResponse;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

/// Answers every query with the response recorded in a JSON file.
///
/// The file is read on each execution, so it can be edited between runs.
#[derive(Debug, Clone)]
pub struct ReplayBackend {
    path: PathBuf,
}

impl ReplayBackend {
    /// Creates a replay backend for the given recording.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the recording.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl QueryBackend for ReplayBackend {
    async fn execute(&self, request: &QueryRequest) -> Result<QueryResponse> {
        info!(
            resource_id = %request.resource_id,
            recording = %self.path.display(),
            "Replaying recorded response"
        );

        let text = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            LensError::backend(format!(
                "Failed to read recorded response {}: {e}",
                self.path.display()
            ))
        })?;

        QueryResponse::from_json(&text)
    }
}
