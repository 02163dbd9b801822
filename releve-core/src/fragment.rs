//! Positioned text fragments and their reconstruction into logical lines.
//!
//! The PDF text layer yields fragments in reading order but with no notion of
//! a "line"; fragments that render on the same row share a y coordinate, so
//! grouping by y rebuilds the rows the statement was laid out with.

use serde::{Deserialize, Serialize};

/// One atomic run of text at a page position, as produced by the external
/// PDF text layer. Coordinates are PDF user space: y grows upward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

/// Fragments sharing a vertical position, concatenated into one text row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub text: String,
    /// x of the first fragment seen at this y.
    pub x: f64,
    pub y: f64,
    /// x of the most recently appended fragment. The trailing fragment of an
    /// operation row is its amount, so this decides the credit/debit column.
    pub last_x: f64,
}

/// Merges raw positioned fragments into logical lines keyed by y.
#[derive(Debug, Clone)]
pub struct LineReconstructor {
    /// Maximum |Δy| for two fragments to share a line. The known-good
    /// statements rely on exact equality, so the default is 0.0; fragments
    /// whose y differs by sub-pixel rounding land on separate lines.
    y_tolerance: f64,
}

impl Default for LineReconstructor {
    fn default() -> Self {
        Self { y_tolerance: 0.0 }
    }
}

impl LineReconstructor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(y_tolerance: f64) -> Self {
        Self { y_tolerance }
    }

    /// Fold fragments into lines, top of page first (descending y).
    ///
    /// Text concatenates in fragment arrival order; the line keeps the x of
    /// its first fragment and tracks the x of its latest one.
    pub fn reconstruct(&self, fragments: &[TextFragment]) -> Vec<Line> {
        let mut lines: Vec<Line> = Vec::new();
        for frag in fragments {
            match lines
                .iter_mut()
                .find(|line| (line.y - frag.y).abs() <= self.y_tolerance)
            {
                Some(line) => {
                    line.text.push_str(&frag.text);
                    line.last_x = frag.x;
                }
                None => lines.push(Line {
                    text: frag.text.clone(),
                    x: frag.x,
                    y: frag.y,
                    last_x: frag.x,
                }),
            }
        }
        lines.sort_by(|a, b| b.y.partial_cmp(&a.y).unwrap_or(std::cmp::Ordering::Equal));
        lines
    }
}
