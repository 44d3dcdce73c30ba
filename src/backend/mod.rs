//! Analytics backend abstraction.
//!
//! The engine never talks to the network itself. Whatever executes the
//! optimized query implements [`QueryBackend`]; the crate ships an in-memory
//! mock and a replay backend that serves recorded responses from disk.

mod mock;
mod replay;

pub use mock::MockBackend;
pub use replay::ReplayBackend;

use crate::error::Result;
use crate::result::QueryResponse;
use async_trait::async_trait;
use std::time::Duration;

/// Default lookback window for queries, in days.
pub const DEFAULT_TIMESPAN_DAYS: u64 = 100;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// A query ready to be sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    /// Resource the query runs against (e.g. an Application Insights resource ID).
    pub resource_id: String,

    /// The optimized query text.
    pub query: String,

    /// Lookback window.
    pub timespan: Duration,
}

impl QueryRequest {
    /// Creates a request with the given lookback in days.
    ///
    /// Lookbacks too large to represent saturate at `u64::MAX` seconds.
    pub fn new(resource_id: impl Into<String>, query: impl Into<String>, timespan_days: u64) -> Self {
        Self {
            resource_id: resource_id.into(),
            query: query.into(),
            timespan: Duration::from_secs(timespan_days.saturating_mul(SECS_PER_DAY)),
        }
    }

    /// Lookback window in whole days.
    pub fn timespan_days(&self) -> u64 {
        self.timespan.as_secs() / SECS_PER_DAY
    }
}

/// Trait implemented by query execution collaborators.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Executes the query and returns the backend's tables.
    async fn execute(&self, request: &QueryRequest) -> Result<QueryResponse>;
}
