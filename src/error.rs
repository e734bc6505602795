//! Error types for schemadiff operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SchemadiffError>;

#[derive(Error, Debug)]
pub enum SchemadiffError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Tables don't match: {left:?} != {right:?}")]
    TableSetMismatch {
        left: Vec<String>,
        right: Vec<String>,
    },

    #[error("Column names don't match for table {table}: {left:?} != {right:?}")]
    ColumnMismatch {
        table: String,
        left: Vec<String>,
        right: Vec<String>,
    },

    #[error("Sort column '{column}' not found in table {table} on {side}")]
    SortColumnMissing {
        table: String,
        column: String,
        side: String,
    },

    #[error("{0:#}")]
    Generic(#[from] anyhow::Error),
}

impl SchemadiffError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }

    /// True for table-set and column-set disagreements between the two sides
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::TableSetMismatch { .. } | Self::ColumnMismatch { .. }
        )
    }
}
