//! Backend response types and normalization.
//!
//! Holds the typed view of an analytics backend response and the normalizer
//! that turns it into compact records for automated consumers.

mod normalizer;
mod response;
mod types;

pub use normalizer::{
    NoDataReason, NormalizedOutput, NormalizedRecord, NormalizerConfig, RecordValue,
    ResultNormalizer, ResultSummary, DEFAULT_SAMPLE_LIMIT, DEFAULT_SAMPLE_SIZE,
};
pub use types::{iso8601, ColumnInfo, QueryResponse, Row, TabularResult, Value};
