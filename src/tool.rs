//! KQL query tool for LLM function calling.
//!
//! Runs `optimize → backend → normalize → render` and always answers with a
//! string: failures are logged and returned as diagnostics so an agent
//! request is never aborted by a telemetry query.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::backend::{QueryBackend, QueryRequest, DEFAULT_TIMESPAN_DAYS};
use crate::config::Config;
use crate::error::{LensError, Result};
use crate::result::{NormalizedOutput, ResultNormalizer};
use crate::rewrite::QueryOptimizer;

/// Name under which the tool is advertised.
pub const TOOL_NAME: &str = "execute_kql_query";

/// Tool definition for LLM function calling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Input parameters for the execute_kql_query tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KqlQueryInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
}

/// Returns the tool definitions available to the LLM.
pub fn get_tool_definitions() -> Vec<ToolDefinition> {
    vec![ToolDefinition {
        name: TOOL_NAME.to_string(),
        description: "Execute a KQL query against Application Insights. Queries are rewritten \
                      to return only essential columns, and large results are summarized."
            .to_string(),
        parameters: serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The KQL query to execute"
                },
                "resource_id": {
                    "type": "string",
                    "description": "The resource ID of the Application Insights instance"
                }
            },
            "required": ["query", "resource_id"]
        }),
    }]
}

/// Short description of a tool call for activity logs.
pub fn one_liner(input: &KqlQueryInput) -> String {
    format!(
        "Executed KQL query against Application Insights using resource ID {}",
        input.resource_id.as_deref().unwrap_or("unknown")
    )
}

/// The query tool: optimizer, backend and normalizer wired together.
pub struct KqlQueryTool<B> {
    optimizer: QueryOptimizer,
    normalizer: ResultNormalizer,
    backend: B,
    timespan_days: u64,
}

impl<B: QueryBackend> KqlQueryTool<B> {
    /// Creates a tool from its parts.
    pub fn new(optimizer: QueryOptimizer, normalizer: ResultNormalizer, backend: B) -> Self {
        Self {
            optimizer,
            normalizer,
            backend,
            timespan_days: DEFAULT_TIMESPAN_DAYS,
        }
    }

    /// Creates a tool using the catalog, thresholds and lookback from configuration.
    pub fn from_config(config: &Config, backend: B) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            optimizer: QueryOptimizer::new(config.catalog()?),
            normalizer: ResultNormalizer::new(config.normalizer),
            backend,
            timespan_days: config.backend.timespan_days,
        })
    }

    /// Sets the lookback window in days.
    pub fn with_timespan_days(mut self, days: u64) -> Self {
        self.timespan_days = days;
        self
    }

    /// The backend queries are sent to.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Handles a function call with JSON arguments.
    pub async fn invoke(&self, params: &serde_json::Value) -> String {
        let input: KqlQueryInput = match serde_json::from_value(params.clone()) {
            Ok(input) => input,
            Err(e) => return diagnostic(&LensError::query(format!("invalid parameters: {e}"))),
        };

        let (Some(query), Some(resource_id)) = (input.query.as_deref(), input.resource_id.as_deref())
        else {
            let missing = if input.query.is_none() { "query" } else { "resource_id" };
            return diagnostic(&LensError::query(format!(
                "missing required parameter '{missing}'"
            )));
        };

        self.run(query, resource_id).await
    }

    /// Runs a query and renders the outcome, turning errors into diagnostics.
    pub async fn run(&self, query: &str, resource_id: &str) -> String {
        match self.execute(query, resource_id).await.and_then(|out| out.render()) {
            Ok(rendered) => rendered,
            Err(e) => diagnostic(&e),
        }
    }

    /// Runs a query and returns the normalized outcome.
    pub async fn execute(&self, query: &str, resource_id: &str) -> Result<NormalizedOutput> {
        let rewrite = self.optimizer.rewrite(query);
        debug!(query = %rewrite.query, "KQL query");

        let request = QueryRequest::new(resource_id, rewrite.query, self.timespan_days);
        let response = self.backend.execute(&request).await?;
        let output = self.normalizer.normalize_response(&response)?;

        info!(
            resource_id,
            rewrite = %rewrite.kind,
            rows = output.total_count(),
            "KQL query completed"
        );
        Ok(output)
    }
}

/// Formats an error the way callers of the tool expect to see it.
///
/// Input problems are reported without the error category prefix.
fn diagnostic(err: &LensError) -> String {
    let message = match err {
        LensError::Formatting(_) => format!("Error formatting query results: {err}"),
        LensError::Query(msg) => format!("Error executing KQL query: {msg}"),
        _ => format!("Error executing KQL query: {err}"),
    };
    error!("{message}");
    message
}
