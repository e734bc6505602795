//! Schema-level reconciliation across two sides
//!
//! Checks that both sides expose the same tables and, per table, the same
//! ordered columns before handing the fetched rows to the dataset
//! reconciler. Structural disagreement aborts the whole run.

use crate::dataset::{ColumnSet, Dataset, Row};
use crate::error::{Result, SchemadiffError};
use crate::output::ReportSink;
use crate::progress::ProgressReporter;
use crate::reconcile::{DatasetReconciler, DiffReport, ReconcileOptions};
use crate::{DEFAULT_IGNORED_COLUMNS, DEFAULT_SORT_COLUMN};
use serde::Serialize;
use std::collections::BTreeSet;

/// One side of a comparison: something that can list tables and columns and
/// fetch ordered rows
pub trait SchemaSource {
    /// Human-readable name of this side, used in messages
    fn label(&self) -> &str;

    /// Table names in this side's schema
    fn list_tables(&self) -> Result<Vec<String>>;

    /// Column names of `table`, in declaration order, ignored columns included
    fn list_columns(&self, table: &str) -> Result<Vec<String>>;

    /// All rows of `table`, fields aligned to `columns`, ascending by `sort_column`
    fn fetch_rows(&self, table: &str, columns: &ColumnSet, sort_column: &str) -> Result<Vec<Row>>;
}

/// Settings for a full run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub ignored_columns: BTreeSet<String>,
    pub sort_column: String,
    pub reconcile: ReconcileOptions,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            ignored_columns: DEFAULT_IGNORED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            sort_column: DEFAULT_SORT_COLUMN.to_string(),
            reconcile: ReconcileOptions::default(),
        }
    }
}

/// Per-table outcome kept after the report has been emitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    pub table: String,
    pub left_rows: usize,
    pub right_rows: usize,
    pub mismatches: usize,
    pub limit_hit: bool,
    pub clean: bool,
}

impl From<&DiffReport> for TableSummary {
    fn from(report: &DiffReport) -> Self {
        Self {
            table: report.table.clone(),
            left_rows: report.left_rows,
            right_rows: report.right_rows,
            mismatches: report.mismatch_count(),
            limit_hit: report.limit_hit,
            clean: report.is_clean(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub tables: Vec<TableSummary>,
}

impl RunSummary {
    pub fn tables_compared(&self) -> usize {
        self.tables.len()
    }

    /// Tables with a count mismatch, an empty side, or mismatch rows
    pub fn tables_with_differences(&self) -> usize {
        self.tables.iter().filter(|t| !t.clean).count()
    }

    pub fn has_differences(&self) -> bool {
        self.tables_with_differences() > 0
    }
}

/// Fails unless both sides hold the same table names, order ignored
pub fn check_table_sets(left: &[String], right: &[String]) -> Result<()> {
    let left_set: BTreeSet<&String> = left.iter().collect();
    let right_set: BTreeSet<&String> = right.iter().collect();
    if left_set != right_set {
        return Err(SchemadiffError::TableSetMismatch {
            left: left.to_vec(),
            right: right.to_vec(),
        });
    }
    Ok(())
}

/// Drives the table-by-table comparison of two sides
pub struct SchemaReconciler {
    options: RunOptions,
    progress: ProgressReporter,
}

impl SchemaReconciler {
    pub fn new(options: RunOptions) -> Self {
        Self {
            options,
            progress: ProgressReporter::new_minimal(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Compare every table of `left` against `right`, one table at a time,
    /// emitting each table's report to `sink` before moving on.
    pub fn run(
        &self,
        left: &dyn SchemaSource,
        right: &dyn SchemaSource,
        sink: &mut dyn ReportSink,
    ) -> Result<RunSummary> {
        let left_tables = left.list_tables()?;
        let right_tables = right.list_tables()?;
        check_table_sets(&left_tables, &right_tables)?;
        log::info!(
            "Comparing {} tables between {} and {}",
            left_tables.len(),
            left.label(),
            right.label()
        );

        let reconciler = DatasetReconciler::new(self.options.reconcile);
        let mut summary = RunSummary::default();
        self.progress.start_tables(left_tables.len() as u64);

        for table in &left_tables {
            let columns = self.aligned_columns(table, left, right)?;

            let left_data = self.fetch(left, table, &columns)?;
            let right_data = self.fetch(right, table, &columns)?;

            let report = reconciler.reconcile(table, &left_data, &right_data);
            self.progress.suspend(|| sink.table_report(&report))?;
            summary.tables.push(TableSummary::from(&report));
            self.progress.table_done();
        }

        self.progress.finish_tables();
        sink.finish(&summary)?;
        Ok(summary)
    }

    /// Column list shared by both sides for `table`, ignored columns removed
    fn aligned_columns(
        &self,
        table: &str,
        left: &dyn SchemaSource,
        right: &dyn SchemaSource,
    ) -> Result<ColumnSet> {
        let left_raw = left.list_columns(table)?;
        let right_raw = right.list_columns(table)?;

        let left_columns = ColumnSet::without_ignored(left_raw.iter().cloned(), &self.options.ignored_columns);
        let right_columns = ColumnSet::without_ignored(right_raw.iter().cloned(), &self.options.ignored_columns);

        if left_columns != right_columns {
            return Err(SchemadiffError::ColumnMismatch {
                table: table.to_string(),
                left: left_columns.names().to_vec(),
                right: right_columns.names().to_vec(),
            });
        }

        for (side, raw) in [(left, &left_raw), (right, &right_raw)] {
            if !raw.iter().any(|c| c == &self.options.sort_column) {
                return Err(SchemadiffError::SortColumnMissing {
                    table: table.to_string(),
                    column: self.options.sort_column.clone(),
                    side: side.label().to_string(),
                });
            }
        }

        Ok(left_columns)
    }

    fn fetch(&self, source: &dyn SchemaSource, table: &str, columns: &ColumnSet) -> Result<Dataset> {
        self.progress.start_fetch(table, source.label());
        let rows = source.fetch_rows(table, columns, &self.options.sort_column)?;
        self.progress.finish_fetch();
        log::debug!("Fetched {} rows of {} from {}", rows.len(), table, source.label());
        Ok(Dataset::new(columns.clone(), rows))
    }
}
