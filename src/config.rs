//! Configuration file for a comparison run

use crate::error::{Result, SchemadiffError};
use crate::reconcile::ReconcileOptions;
use crate::schema::RunOptions;
use crate::sql::substitute_env_vars;
use crate::{DEFAULT_IGNORED_COLUMNS, DEFAULT_MISMATCH_LIMIT, DEFAULT_SORT_COLUMN};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Connection settings for one side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SideConfig {
    Postgres {
        #[serde(default)]
        label: Option<String>,
        #[serde(default = "default_pg_host")]
        host: String,
        #[serde(default = "default_pg_port")]
        port: u16,
        #[serde(default = "default_pg_user")]
        user: String,
        #[serde(default = "default_pg_password")]
        password: String,
        #[serde(default = "default_pg_database")]
        database: String,
        #[serde(default = "default_pg_schema")]
        schema: String,
    },
    #[serde(rename = "duckdb")]
    DuckDb {
        #[serde(default)]
        label: Option<String>,
        path: PathBuf,
        #[serde(default = "default_file_schema")]
        schema: String,
    },
    Sqlite {
        #[serde(default)]
        label: Option<String>,
        path: PathBuf,
    },
}

fn default_pg_host() -> String {
    "localhost".to_string()
}

fn default_pg_port() -> u16 {
    5432
}

fn default_pg_user() -> String {
    "postgres".to_string()
}

fn default_pg_password() -> String {
    "postgres".to_string()
}

fn default_pg_database() -> String {
    "tenant_storage".to_string()
}

fn default_pg_schema() -> String {
    "public".to_string()
}

fn default_file_schema() -> String {
    "main".to_string()
}

impl SideConfig {
    /// Configured label, or a description derived from the connection
    pub fn display_name(&self) -> String {
        match self {
            SideConfig::Postgres { label: Some(l), .. }
            | SideConfig::DuckDb { label: Some(l), .. }
            | SideConfig::Sqlite { label: Some(l), .. } => l.clone(),
            SideConfig::Postgres {
                host, port, schema, ..
            } => format!("{}:{}/{}", host, port, schema),
            SideConfig::DuckDb { path, .. } | SideConfig::Sqlite { path, .. } => {
                path.display().to_string()
            }
        }
    }

    /// Schema holding the compared tables
    pub fn schema(&self) -> &str {
        match self {
            SideConfig::Postgres { schema, .. } | SideConfig::DuckDb { schema, .. } => schema,
            SideConfig::Sqlite { .. } => "main",
        }
    }

    /// Fill in `{VAR}` placeholders of a database file path, then make a
    /// relative result relative to `base` instead of the working directory
    fn resolve_path(&mut self, base: &Path) -> Result<()> {
        match self {
            SideConfig::DuckDb { path, .. } | SideConfig::Sqlite { path, .. } => {
                let expanded = PathBuf::from(substitute_env_vars(&path.to_string_lossy())?);
                *path = if expanded.is_relative() {
                    base.join(expanded)
                } else {
                    expanded
                };
            }
            SideConfig::Postgres { .. } => {}
        }
        Ok(())
    }

    /// Copy with `{VAR}` placeholders in connection fields replaced from the
    /// environment. File paths are expanded when the config is loaded.
    pub fn resolved(&self) -> Result<Self> {
        Ok(match self {
            SideConfig::Postgres {
                label,
                host,
                port,
                user,
                password,
                database,
                schema,
            } => SideConfig::Postgres {
                label: label.clone(),
                host: substitute_env_vars(host)?,
                port: *port,
                user: substitute_env_vars(user)?,
                password: substitute_env_vars(password)?,
                database: substitute_env_vars(database)?,
                schema: substitute_env_vars(schema)?,
            },
            SideConfig::DuckDb { label, path, schema } => SideConfig::DuckDb {
                label: label.clone(),
                path: path.clone(),
                schema: substitute_env_vars(schema)?,
            },
            SideConfig::Sqlite { .. } => self.clone(),
        })
    }
}

fn default_ignore_columns() -> BTreeSet<String> {
    DEFAULT_IGNORED_COLUMNS.iter().map(|c| c.to_string()).collect()
}

fn default_mismatch_limit() -> usize {
    DEFAULT_MISMATCH_LIMIT
}

fn default_sort_column() -> String {
    DEFAULT_SORT_COLUMN.to_string()
}

/// Contents of the configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub left: SideConfig,
    pub right: SideConfig,
    #[serde(default = "default_ignore_columns")]
    pub ignore_columns: BTreeSet<String>,
    #[serde(default = "default_mismatch_limit")]
    pub mismatch_limit: usize,
    #[serde(default = "default_sort_column")]
    pub sort_column: String,
}

/// Command-line values that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub ignore_columns: Vec<String>,
    pub mismatch_limit: Option<usize>,
    pub sort_column: Option<String>,
}

impl Config {
    /// Read and validate a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SchemadiffError::config(format!(
                "Configuration file not found: {} (run `schemadiff init` to create one)",
                path.display()
            )));
        }

        let content = fs::read_to_string(path)?;
        let mut config: Config = serde_json::from_str(&content).map_err(|e| {
            SchemadiffError::config(format!("Invalid configuration file '{}': {}", path.display(), e))
        })?;
        config.validate()?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        config.left.resolve_path(base)?;
        config.right.resolve_path(base)?;
        Ok(config)
    }

    /// Template written by `init`, two replicas of the same tenant schema
    pub fn template() -> Self {
        Self {
            left: SideConfig::Postgres {
                label: Some("primary".to_string()),
                host: default_pg_host(),
                port: 5434,
                user: default_pg_user(),
                password: "{PGPASSWORD}".to_string(),
                database: default_pg_database(),
                schema: default_pg_schema(),
            },
            right: SideConfig::Postgres {
                label: Some("replica".to_string()),
                host: default_pg_host(),
                port: 5433,
                user: default_pg_user(),
                password: "{PGPASSWORD}".to_string(),
                database: default_pg_database(),
                schema: default_pg_schema(),
            },
            ignore_columns: default_ignore_columns(),
            mismatch_limit: DEFAULT_MISMATCH_LIMIT,
            sort_column: default_sort_column(),
        }
    }

    /// Write the configuration as pretty JSON, refusing to overwrite unless `force`
    pub fn save(&self, path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            return Err(SchemadiffError::config(format!(
                "Configuration file already exists: {} (use --force to overwrite)",
                path.display()
            )));
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.mismatch_limit == 0 {
            return Err(SchemadiffError::config("mismatch_limit must be greater than 0"));
        }
        if self.sort_column.trim().is_empty() {
            return Err(SchemadiffError::config("sort_column must not be empty"));
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: Overrides) -> Result<()> {
        self.ignore_columns.extend(overrides.ignore_columns);
        if let Some(limit) = overrides.mismatch_limit {
            self.mismatch_limit = limit;
        }
        if let Some(column) = overrides.sort_column {
            self.sort_column = column;
        }
        self.validate()
    }

    pub fn run_options(&self, count_only: bool) -> RunOptions {
        RunOptions {
            ignored_columns: self.ignore_columns.clone(),
            sort_column: self.sort_column.clone(),
            reconcile: ReconcileOptions {
                mismatch_limit: self.mismatch_limit,
                count_only,
            },
        }
    }
}
