//! Progress reporting utilities

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Progress reporter for a comparison run.
///
/// A single bar counts finished tables; its message names the fetch in
/// flight. Everything is drawn on stderr so reports on stdout stay clean.
#[derive(Debug)]
pub struct ProgressReporter {
    tables_pb: ProgressBar,
    show_progress: bool,
}

impl ProgressReporter {
    /// Create progress reporter for compare runs
    pub fn new_for_compare() -> Self {
        let tables_pb = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());
        tables_pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {pos}/{len} tables {msg}")
                .expect("Invalid progress template")
                .progress_chars("#>-"),
        );

        Self {
            tables_pb,
            show_progress: true,
        }
    }

    /// Create minimal progress reporter (draws nothing)
    pub fn new_minimal() -> Self {
        Self {
            tables_pb: ProgressBar::hidden(),
            show_progress: false,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.show_progress
    }

    pub fn start_tables(&self, total: u64) {
        self.tables_pb.set_length(total);
        self.tables_pb.set_position(0);
        if self.show_progress {
            self.tables_pb.enable_steady_tick(Duration::from_millis(100));
        }
    }

    pub fn start_fetch(&self, table: &str, side: &str) {
        self.tables_pb
            .set_message(format!("Fetching {} from {}...", table, side));
    }

    pub fn finish_fetch(&self) {
        self.tables_pb.set_message("");
    }

    pub fn table_done(&self) {
        self.tables_pb.inc(1);
    }

    /// Run `f` with the bar hidden so it can print freely
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.tables_pb.suspend(f)
    }

    pub fn finish_tables(&self) {
        self.tables_pb.finish_and_clear();
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if !self.tables_pb.is_finished() {
            self.tables_pb.finish_and_clear();
        }
    }
}
