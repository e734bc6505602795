//! # schemadiff
//!
//! Reconciles two replicas of the same database schema: table sets, column
//! lists, and row-by-row contents, reporting every differing field in a
//! bounded, readable form.

pub mod cli;
pub mod error;
pub mod config;
pub mod sql;
pub mod value;
pub mod dataset;
pub mod row_diff;
pub mod reconcile;
pub mod schema;
pub mod source;
pub mod commands;
pub mod output;
pub mod progress;

pub use error::{Result, SchemadiffError};
pub use reconcile::{DatasetReconciler, DiffReport, ReconcileOptions};
pub use schema::{SchemaReconciler, SchemaSource};

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "schemadiff.json";

/// Default maximum number of mismatch rows reported per table
pub const DEFAULT_MISMATCH_LIMIT: usize = 30;

/// Default column both sides are ordered by
pub const DEFAULT_SORT_COLUMN: &str = "endtime";

/// Housekeeping columns left out of every comparison by default
pub const DEFAULT_IGNORED_COLUMNS: [&str; 2] = ["capturetime", "_id"];
