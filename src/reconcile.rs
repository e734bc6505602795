//! Dataset reconciliation: count checks, positional row diffing and the
//! bounded mismatch report for one table.

use crate::dataset::{ColumnSet, Dataset};
use crate::row_diff::{diff_rows, RenderedRow};
use crate::DEFAULT_MISMATCH_LIMIT;
use serde::Serialize;

/// Options controlling one table's comparison pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Maximum number of mismatch rows collected before the scan stops
    pub mismatch_limit: usize,
    /// Only compare row counts
    pub count_only: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            mismatch_limit: DEFAULT_MISMATCH_LIMIT,
            count_only: false,
        }
    }
}

/// Outcome of the row count check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CountStatus {
    Matches { rows: usize },
    Mismatch { left: usize, right: usize },
}

/// Result of reconciling one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffReport {
    pub table: String,
    pub header: ColumnSet,
    pub left_rows: usize,
    pub right_rows: usize,
    pub count: CountStatus,
    pub count_only: bool,
    /// Row pairs actually diffed
    pub compared_rows: usize,
    pub mismatches: Vec<RenderedRow>,
    pub limit_hit: bool,
}

impl DiffReport {
    pub fn mismatch_count(&self) -> usize {
        self.mismatches.len()
    }

    pub fn has_empty_side(&self) -> bool {
        self.left_rows == 0 || self.right_rows == 0
    }

    /// Counts differ and only the overlapping prefix was diffed
    pub fn is_prefix_only(&self) -> bool {
        matches!(self.count, CountStatus::Mismatch { .. }) && self.compared_rows > 0
    }

    /// True when counts agree, both sides hold rows, and no row differed
    pub fn is_clean(&self) -> bool {
        matches!(self.count, CountStatus::Matches { .. })
            && !self.has_empty_side()
            && self.mismatches.is_empty()
    }
}

/// Compares two ordered datasets position by position
#[derive(Debug, Clone, Default)]
pub struct DatasetReconciler {
    options: ReconcileOptions,
}

impl DatasetReconciler {
    pub fn new(options: ReconcileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    /// Reconcile `left` against `right` for `table`.
    ///
    /// The header is taken from `left`; callers guarantee both datasets were
    /// fetched with the same column list. When row counts differ only the
    /// common prefix is compared.
    pub fn reconcile(&self, table: &str, left: &Dataset, right: &Dataset) -> DiffReport {
        let left_rows = left.len();
        let right_rows = right.len();

        let count = if left_rows == right_rows {
            CountStatus::Matches { rows: left_rows }
        } else {
            CountStatus::Mismatch {
                left: left_rows,
                right: right_rows,
            }
        };

        let mut report = DiffReport {
            table: table.to_string(),
            header: left.columns().clone(),
            left_rows,
            right_rows,
            count,
            count_only: self.options.count_only,
            compared_rows: 0,
            mismatches: Vec::new(),
            limit_hit: false,
        };

        if self.options.count_only || report.has_empty_side() {
            return report;
        }

        let bound = left_rows.min(right_rows);
        log::debug!(
            "Diffing {} row pairs of {} (left {}, right {})",
            bound,
            table,
            left_rows,
            right_rows
        );

        for (index, (a, b)) in left.rows().iter().zip(right.rows()).enumerate() {
            report.compared_rows = index + 1;
            let (row, has_diff) = diff_rows(index, a, b);
            if has_diff {
                report.mismatches.push(row);
                if report.mismatches.len() >= self.options.mismatch_limit {
                    report.limit_hit = true;
                    break;
                }
            }
        }

        report
    }
}
