//! Command-line interface for schemadiff

use crate::DEFAULT_CONFIG_FILE;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "schemadiff")]
#[command(about = "Reconcile two replicas of a database schema table by table")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file describing both sides
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a template configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Compare tables, columns and rows of both sides
    Compare {
        /// Only compare row counts
        #[arg(long)]
        count_only: bool,

        /// Additional column to leave out of every comparison (repeatable)
        #[arg(long = "ignore-column", value_name = "COLUMN")]
        ignore_columns: Vec<String>,

        /// Maximum mismatch rows reported per table (must be > 0)
        #[arg(long, value_parser = validate_mismatch_limit)]
        mismatch_limit: Option<usize>,

        /// Column both sides are ordered by before comparing
        #[arg(long)]
        sort_column: Option<String>,

        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,

        /// Write the JSON report to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Exit with status 2 when any table has differences
        #[arg(long)]
        fail_on_mismatch: bool,

        /// Do not draw progress bars
        #[arg(long)]
        no_progress: bool,
    },

    /// List the tables of both sides and check that they agree
    Tables,
}

/// Parse output format string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    Pretty,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {}. Use 'pretty' or 'json'", s)),
        }
    }
}

/// Validate that the mismatch limit is greater than 0
fn validate_mismatch_limit(s: &str) -> Result<usize, String> {
    let limit: usize = s
        .parse()
        .map_err(|_| format!("Invalid mismatch limit: '{}'. Must be a positive integer.", s))?;

    if limit == 0 {
        return Err("Mismatch limit must be greater than 0".to_string());
    }

    Ok(limit)
}
