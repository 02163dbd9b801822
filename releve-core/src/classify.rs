//! Heuristic classification of reconstructed lines.
//!
//! Two sub-templates of the statement's first column have been observed: rows
//! starting at the far-left offsets, and rows indented to a second offset set.
//! Everything else on the page (headers, footers, page furniture) is noise.

use regex::Regex;
use tracing::debug;

use crate::fragment::Line;

/// Known x offsets of operation rows under the primary sub-template.
pub const START_X_OFFSETS: [f64; 4] = [52.559999999999995, 53.519999999999996, 53.76, 52.8];

/// Known x offsets of rows under the alternate (indented) sub-template.
pub const ALT_START_X_OFFSETS: [f64; 3] = [85.92, 89.28, 86.16];

/// An operation row: DD/MM date, free text (optionally a 7-digit reference
/// and/or a /NNNN suffix), then a signed comma-decimal amount.
pub const ROW_PATTERN: &str =
    r"^([0-9]{2}/[0-9]{2})(.+?(?:[0-9]{7})?(?:/[0-9]{4})?) ([ 0-9+-]+?,[0-9]{2})";

/// Rows under the alternate sub-template that are column headers, not data.
/// Case-sensitive as observed on the statements.
pub const BLACKLIST_PATTERN: &str = "^(?:date| touche)";

/// How a reconstructed line participates in extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    /// Starts a new transaction.
    TransactionStart,
    /// Extends the previous transaction's description.
    Continuation,
    /// Header/footer noise, skipped entirely.
    Discard,
}

/// Per-template constants, kept as data so a new statement template is a new
/// config value rather than new classification code.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub start_offsets: Vec<f64>,
    pub alt_start_offsets: Vec<f64>,
    pub row_pattern: String,
    pub blacklist_pattern: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            start_offsets: START_X_OFFSETS.to_vec(),
            alt_start_offsets: ALT_START_X_OFFSETS.to_vec(),
            row_pattern: ROW_PATTERN.to_string(),
            blacklist_pattern: BLACKLIST_PATTERN.to_string(),
        }
    }
}

/// Decides, per line, whether it starts a transaction, continues one, or is noise.
#[derive(Debug)]
pub struct LineClassifier {
    start_offsets: Vec<f64>,
    alt_start_offsets: Vec<f64>,
    row_re: Regex,
    blacklist_re: Regex,
}

impl LineClassifier {
    pub fn new() -> anyhow::Result<Self> {
        Self::from_config(&ClassifierConfig::default())
    }

    pub fn from_config(config: &ClassifierConfig) -> anyhow::Result<Self> {
        Ok(Self {
            start_offsets: config.start_offsets.clone(),
            alt_start_offsets: config.alt_start_offsets.clone(),
            row_re: Regex::new(&config.row_pattern)?,
            blacklist_re: Regex::new(&config.blacklist_pattern)?,
        })
    }

    /// Classify one line.
    ///
    /// Rule A: primary offset and the row pattern matches. Rule B: alternate
    /// offset and not blacklisted; still a start if the row pattern matches,
    /// otherwise folded into the previous transaction.
    pub fn classify(&self, line: &Line) -> LineClass {
        if self.start_offsets.contains(&line.x) && self.row_re.is_match(&line.text) {
            return LineClass::TransactionStart;
        }
        if self.alt_start_offsets.contains(&line.x) && !self.blacklist_re.is_match(&line.text) {
            if self.row_re.is_match(&line.text) {
                return LineClass::TransactionStart;
            }
            debug!(y = line.y, text = %line.text, "alternate-template line treated as continuation");
            return LineClass::Continuation;
        }
        LineClass::Discard
    }

    /// Capture groups of the operation row pattern: (DD/MM, description, amount).
    pub fn row_captures<'t>(&self, text: &'t str) -> Option<regex::Captures<'t>> {
        self.row_re.captures(text)
    }
}
