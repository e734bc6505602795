//! Common test utilities and helpers

use schemadiff::dataset::{ColumnSet, Dataset, Row};
use schemadiff::value::Value;
use schemadiff::{Result, SchemaSource, SchemadiffError};
use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// In-memory side: tables are returned in insertion order and rows exactly
/// as given, so tests supply them already sorted
pub struct MemorySource {
    label: String,
    tables: Vec<MemoryTable>,
    fetches: Cell<usize>,
}

struct MemoryTable {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl MemorySource {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            tables: Vec::new(),
            fetches: Cell::new(0),
        }
    }

    pub fn with_table(mut self, name: &str, columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        self.tables.push(MemoryTable {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        });
        self
    }

    /// Number of `fetch_rows` calls made so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.get()
    }

    fn table(&self, name: &str) -> Result<&MemoryTable> {
        self.tables
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| SchemadiffError::invalid_input(format!("no table {}", name)))
    }
}

impl SchemaSource for MemorySource {
    fn label(&self) -> &str {
        &self.label
    }

    fn list_tables(&self) -> Result<Vec<String>> {
        Ok(self.tables.iter().map(|t| t.name.clone()).collect())
    }

    fn list_columns(&self, table: &str) -> Result<Vec<String>> {
        Ok(self.table(table)?.columns.clone())
    }

    fn fetch_rows(&self, table: &str, columns: &ColumnSet, _sort_column: &str) -> Result<Vec<Row>> {
        self.fetches.set(self.fetches.get() + 1);
        let table = self.table(table)?;

        let positions: Vec<usize> = columns
            .names()
            .iter()
            .map(|name| {
                table.columns.iter().position(|c| c == name).ok_or_else(|| {
                    SchemadiffError::invalid_input(format!("no column {}", name))
                })
            })
            .collect::<Result<_>>()?;

        Ok(table
            .rows
            .iter()
            .map(|row| Row::new(positions.iter().map(|&i| row[i].clone()).collect()))
            .collect())
    }
}

/// Build a dataset from integer rows
pub fn int_dataset(columns: &[&str], rows: &[Vec<i64>]) -> Dataset {
    Dataset::new(
        ColumnSet::from(columns.to_vec()),
        rows.iter()
            .map(|r| Row::new(r.iter().copied().map(Value::Int).collect()))
            .collect(),
    )
}

/// Test fixture managing a scratch directory with databases and config files
pub struct TestFixture {
    pub temp_dir: TempDir,
}

impl TestFixture {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    /// Get the root path of the test fixture
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.root().join("schemadiff.json")
    }

    /// Create a DuckDB database file and run `sql` against it
    pub fn create_duckdb(&self, name: &str, sql: &str) -> Result<PathBuf> {
        let path = self.root().join(name);
        let conn = duckdb::Connection::open(&path)?;
        conn.execute_batch(sql)?;
        Ok(path)
    }

    /// Write a config comparing two DuckDB files in this fixture
    pub fn write_duckdb_config(&self, left: &str, right: &str, extra: &str) -> Result<PathBuf> {
        let content = format!(
            r#"{{
                "left": {{ "kind": "duckdb", "label": "left", "path": "{}" }},
                "right": {{ "kind": "duckdb", "label": "right", "path": "{}" }}{}
            }}"#,
            left, right, extra
        );
        let path = self.config_path();
        fs::write(&path, content)?;
        Ok(path)
    }
}

/// Helper for running CLI commands in tests
pub struct CliTestRunner {
    fixture: TestFixture,
}

impl CliTestRunner {
    pub fn new() -> Result<Self> {
        Ok(Self {
            fixture: TestFixture::new()?,
        })
    }

    pub fn fixture(&self) -> &TestFixture {
        &self.fixture
    }

    /// Run a schemadiff command against the fixture's config file
    pub fn run_command(&self, args: &[&str]) -> Result<schemadiff::commands::CommandOutcome> {
        use clap::Parser;
        use schemadiff::cli::Cli;
        use schemadiff::commands::execute_command;

        let config = self.fixture.config_path();
        let config = config.to_string_lossy();
        let mut cmd_args = vec!["schemadiff", "--config", config.as_ref()];
        cmd_args.extend(args);

        let cli = Cli::try_parse_from(cmd_args)
            .map_err(|e| SchemadiffError::invalid_input(e.to_string()))?;

        execute_command(cli.command, &cli.config)
    }

    /// Run a command and expect it to succeed
    pub fn expect_success(&self, args: &[&str]) -> schemadiff::commands::CommandOutcome {
        self.run_command(args).expect("Command should succeed")
    }

    /// Run a command and expect it to fail
    pub fn expect_failure(&self, args: &[&str]) -> SchemadiffError {
        self.run_command(args).expect_err("Command should fail")
    }

    /// Run `compare` with a JSON report and return the parsed document
    pub fn compare_json(&self, args: &[&str]) -> serde_json::Value {
        let report = self.fixture.root().join("report.json");
        let report_str = report.to_string_lossy().to_string();
        let mut full = vec!["compare", "--format", "json", "--output", report_str.as_str()];
        full.extend(args);
        self.expect_success(&full);

        let content = fs::read_to_string(&report).expect("Report should be written");
        serde_json::from_str(&content).expect("Report should be valid JSON")
    }
}

/// Sample table definitions
pub mod sample_data {
    /// Orders table with housekeeping columns, three rows sorted by endtime
    pub const ORDERS: &str = "
        CREATE TABLE orders (_id INTEGER, id INTEGER, amount DOUBLE, capturetime TIMESTAMP, endtime TIMESTAMP);
        INSERT INTO orders VALUES
            (100, 1, 1.50, TIMESTAMP '2024-01-01 00:00:00', TIMESTAMP '2024-01-01 10:00:00'),
            (101, 2, 0.75, TIMESTAMP '2024-01-01 00:00:00', TIMESTAMP '2024-01-01 11:00:00'),
            (102, 3, 2.00, TIMESTAMP '2024-01-01 00:00:00', TIMESTAMP '2024-01-01 12:00:00');
    ";

    /// Same orders, different housekeeping values and one changed amount
    pub const ORDERS_CHANGED: &str = "
        CREATE TABLE orders (_id INTEGER, id INTEGER, amount DOUBLE, capturetime TIMESTAMP, endtime TIMESTAMP);
        INSERT INTO orders VALUES
            (900, 1, 1.50, TIMESTAMP '2030-01-01 00:00:00', TIMESTAMP '2024-01-01 10:00:00'),
            (901, 2, 0.80, TIMESTAMP '2030-01-01 00:00:00', TIMESTAMP '2024-01-01 11:00:00'),
            (902, 3, 2.00, TIMESTAMP '2030-01-01 00:00:00', TIMESTAMP '2024-01-01 12:00:00');
    ";

    pub const USERS: &str = "
        CREATE TABLE users (id INTEGER, name VARCHAR, endtime TIMESTAMP);
        INSERT INTO users VALUES
            (1, 'Café', TIMESTAMP '2024-01-01 10:00:00'),
            (2, 'Naïve', TIMESTAMP '2024-01-02 10:00:00');
    ";

    pub const USERS_WITH_CURRENCY: &str = "
        CREATE TABLE users (id INTEGER, name VARCHAR, currency VARCHAR, endtime TIMESTAMP);
        INSERT INTO users VALUES
            (1, 'Café', 'EUR', TIMESTAMP '2024-01-01 10:00:00'),
            (2, 'Naïve', 'USD', TIMESTAMP '2024-01-02 10:00:00');
    ";
}
