//! Command-line argument parsing for kql-lens.
//!
//! Uses clap to parse the subcommands and global overrides.

use clap::{Parser, Subcommand};
use kql_lens::config::Config;
use kql_lens::error::{LensError, Result};
use std::io::Read;
use std::path::PathBuf;

/// Projection-minimizing KQL rewriter and result normalizer.
#[derive(Parser, Debug)]
#[command(name = "kql-lens")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Summarize results with more rows than this
    #[arg(long, value_name = "ROWS", global = true)]
    pub sample_limit: Option<usize>,

    /// Number of rows kept in a summary sample
    #[arg(long, value_name = "ROWS", global = true)]
    pub sample_size: Option<usize>,

    /// Enable debug logging for kql-lens
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the optimized form of a query
    Optimize {
        /// KQL query text ("-" reads stdin)
        #[arg(value_name = "QUERY")]
        query: String,
    },

    /// Normalize a recorded Log Analytics JSON response
    Normalize {
        /// Path to the recorded response ("-" reads stdin)
        #[arg(value_name = "RESPONSE")]
        response: String,
    },

    /// Optimize a query, run it against a recorded response and normalize the result
    Run {
        /// KQL query text ("-" reads stdin)
        #[arg(value_name = "QUERY")]
        query: String,

        /// Resource the query targets
        #[arg(long, value_name = "ID")]
        resource_id: String,

        /// Recorded response served in place of a live backend
        #[arg(long, value_name = "PATH")]
        replay: PathBuf,

        /// Lookback window in days
        #[arg(long, value_name = "DAYS")]
        timespan_days: Option<u64>,
    },

    /// List the tables and essential columns in the active catalog
    Tables,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path (from args or default).
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Applies command-line overrides on top of the loaded config.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(limit) = self.sample_limit {
            config.normalizer.sample_limit = limit;
        }
        if let Some(size) = self.sample_size {
            config.normalizer.sample_size = size;
        }
        if let Command::Run {
            timespan_days: Some(days),
            ..
        } = &self.command
        {
            config.backend.timespan_days = *days;
        }
    }
}

/// Returns the argument itself, or stdin when it is `-`.
pub fn read_arg_or_stdin(arg: &str) -> Result<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .map_err(|e| LensError::query(format!("Failed to read stdin: {e}")))?;
    Ok(buf)
}
