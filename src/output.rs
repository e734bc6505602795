//! Output formatting utilities

use crate::error::Result;
use crate::reconcile::{CountStatus, DiffReport};
use crate::row_diff::RenderedCell;
use crate::schema::RunSummary;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

/// Receives each table's report as soon as it is complete
pub trait ReportSink {
    fn table_report(&mut self, report: &DiffReport) -> Result<()>;

    /// Called once after every table was compared
    fn finish(&mut self, summary: &RunSummary) -> Result<()>;
}

/// Human-readable report lines plus a diff table per table
pub struct PrettyPrinter<W: Write> {
    out: W,
    color: bool,
}

impl PrettyPrinter<io::Stdout> {
    pub fn stdout() -> Self {
        Self {
            out: io::stdout(),
            color: true,
        }
    }
}

impl<W: Write> PrettyPrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out, color: false }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Build the diff table: header row, then one row per mismatch
    pub fn render_table(&self, report: &DiffReport) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        if !self.color {
            table.force_no_tty();
        }
        table.set_header(report.header.names().to_vec());

        for row in &report.mismatches {
            let cells: Vec<Cell> = row
                .cells
                .iter()
                .map(|cell| match cell {
                    RenderedCell::Same(_) => Cell::new(cell),
                    RenderedCell::Changed { .. } if self.color => Cell::new(cell).fg(Color::Red),
                    RenderedCell::Changed { .. } => Cell::new(cell),
                })
                .collect();
            table.add_row(cells);
        }

        table
    }
}

/// Per-table summary lines, in the order they are printed
pub fn report_lines(report: &DiffReport) -> Vec<String> {
    let mut lines = vec![format!("Comparing {}", report.table)];

    match report.count {
        CountStatus::Mismatch { left, right } => {
            lines.push(format!("{} data doesn't match: {} != {}", report.table, left, right));
        }
        CountStatus::Matches { rows } if rows > 0 => {
            lines.push(format!("Count matches: {}", rows));
        }
        CountStatus::Matches { .. } => {}
    }

    if report.has_empty_side() {
        lines.push(format!(
            "One of the tables ({} rows, {} rows) is empty.",
            report.left_rows, report.right_rows
        ));
    }

    if report.count_only {
        return lines;
    }

    if report.is_prefix_only() {
        lines.push(format!("Compared the first {} rows only.", report.compared_rows));
    }

    if report.limit_hit {
        lines.push("Mismatch limit hit.".to_string());
    }

    lines
}

impl<W: Write> ReportSink for PrettyPrinter<W> {
    fn table_report(&mut self, report: &DiffReport) -> Result<()> {
        for line in report_lines(report) {
            writeln!(self.out, "{}", line)?;
        }

        if !report.count_only && !report.has_empty_side() {
            if report.mismatches.is_empty() {
                writeln!(self.out, "Data matches.")?;
            } else {
                writeln!(self.out, "{}", self.render_table(report))?;
            }
        }

        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }

    fn finish(&mut self, summary: &RunSummary) -> Result<()> {
        writeln!(
            self.out,
            "Compared {} tables, {} with differences.",
            summary.tables_compared(),
            summary.tables_with_differences()
        )?;
        self.out.flush()?;
        Ok(())
    }
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    tables: &'a [DiffReport],
    summary: &'a RunSummary,
}

/// Collects every report and writes one JSON document at the end
pub struct JsonReporter {
    destination: Option<PathBuf>,
    reports: Vec<DiffReport>,
}

impl JsonReporter {
    /// Write to `destination`, or stdout when `None`
    pub fn new(destination: Option<PathBuf>) -> Self {
        Self {
            destination,
            reports: Vec::new(),
        }
    }

    pub fn reports(&self) -> &[DiffReport] {
        &self.reports
    }

    pub fn to_json(&self, summary: &RunSummary) -> Result<String> {
        let document = JsonDocument {
            tables: &self.reports,
            summary,
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }
}

impl ReportSink for JsonReporter {
    fn table_report(&mut self, report: &DiffReport) -> Result<()> {
        self.reports.push(report.clone());
        Ok(())
    }

    fn finish(&mut self, summary: &RunSummary) -> Result<()> {
        let json = self.to_json(summary)?;
        match &self.destination {
            Some(path) => {
                fs::write(path, json)?;
                log::info!("Report written to: {}", path.display());
            }
            None => println!("{}", json),
        }
        Ok(())
    }
}
