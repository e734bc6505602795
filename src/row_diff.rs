//! Positional comparison of two rows

use crate::dataset::Row;
use crate::value::{normalize, Value};
use serde::Serialize;
use std::fmt;

/// Separator shown between the two sides of a changed cell
pub const CHANGE_SEPARATOR: &str = "->";

/// Text shown for a field one of the rows does not have
const MISSING_FIELD: &str = "<missing>";

/// A rendered cell of a compared row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderedCell {
    Same(String),
    Changed { left: String, right: String },
}

impl RenderedCell {
    pub fn is_changed(&self) -> bool {
        matches!(self, RenderedCell::Changed { .. })
    }
}

impl fmt::Display for RenderedCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderedCell::Same(text) => f.write_str(text),
            RenderedCell::Changed { left, right } => {
                write!(f, "{} {} {}", left, CHANGE_SEPARATOR, right)
            }
        }
    }
}

/// All cells of a compared row, in column order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedRow {
    /// Position of the row in both datasets
    pub index: usize,
    pub cells: Vec<RenderedCell>,
}

impl RenderedRow {
    pub fn changed_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.is_changed()).count()
    }

    pub fn to_strings(&self) -> Vec<String> {
        self.cells.iter().map(ToString::to_string).collect()
    }
}

/// Compare two rows field by field on raw values.
///
/// Normalization only shapes the rendered text; it never decides sameness.
/// Rows are expected to share a width; a field present on one side only is
/// rendered as changed against a `<missing>` marker.
pub fn diff_rows(index: usize, left: &Row, right: &Row) -> (RenderedRow, bool) {
    if left.len() != right.len() {
        log::warn!(
            "Row {} has {} fields on the left and {} on the right",
            index,
            left.len(),
            right.len()
        );
    }

    let width = left.len().max(right.len());
    let mut cells = Vec::with_capacity(width);
    let mut has_diff = false;

    for i in 0..width {
        let cell = match (left.get(i), right.get(i)) {
            (Some(a), Some(b)) if a == b => RenderedCell::Same(normalize(a)),
            (a, b) => {
                has_diff = true;
                RenderedCell::Changed {
                    left: render_field(a),
                    right: render_field(b),
                }
            }
        };
        cells.push(cell);
    }

    (RenderedRow { index, cells }, has_diff)
}

fn render_field(value: Option<&Value>) -> String {
    value.map(normalize).unwrap_or_else(|| MISSING_FIELD.to_string())
}
