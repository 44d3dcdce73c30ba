//! kql-lens - Projection-minimizing KQL rewriter and result normalizer.
//!
//! Rewrites telemetry queries so the backend returns only essential columns,
//! and normalizes the tabular response into compact records for
//! token-constrained consumers.

pub mod backend;
pub mod catalog;
pub mod config;
pub mod error;
pub mod result;
pub mod rewrite;
pub mod tool;
