//! Statement layout detection.
//!
//! The bank changed its template when it dropped the legacy franc column:
//! older statements carry an "en francs" notation and place the amount
//! columns further left. The marker can appear on any page, so detection is
//! a single read-only pass over the raw fragment stream.

use serde::{Deserialize, Serialize};

use crate::fragment::TextFragment;

/// Substring whose presence anywhere in the document selects the legacy layout.
pub const LEGACY_CURRENCY_MARKER: &str = "en francs";

/// The two recognized statement layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatementFormat {
    #[serde(rename = "with-legacy-currency")]
    WithLegacyCurrency,
    #[serde(rename = "without-legacy-currency")]
    WithoutLegacyCurrency,
}

/// Horizontal page bands holding the credit and debit amount columns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnRanges {
    pub credit: (f64, f64),
    pub debit: (f64, f64),
}

impl ColumnRanges {
    /// True when x falls inside the debit band (inclusive). Anything outside
    /// both bands counts as credit, which keeps the legacy fallback intact.
    pub fn is_debit(&self, x: f64) -> bool {
        x >= self.debit.0 && x <= self.debit.1
    }
}

impl StatementFormat {
    /// Column bands are fixed per layout; they are not derived from content.
    pub fn column_ranges(self) -> ColumnRanges {
        match self {
            StatementFormat::WithoutLegacyCurrency => ColumnRanges {
                credit: (504.0, 562.0),
                debit: (439.0, 491.0),
            },
            StatementFormat::WithLegacyCurrency => ColumnRanges {
                credit: (400.0, 442.0),
                debit: (335.0, 371.0),
            },
        }
    }
}

/// Scan the fragment stream for the legacy-currency marker.
pub fn detect_format(fragments: &[TextFragment]) -> StatementFormat {
    if fragments
        .iter()
        .any(|f| f.text.contains(LEGACY_CURRENCY_MARKER))
    {
        StatementFormat::WithLegacyCurrency
    } else {
        StatementFormat::WithoutLegacyCurrency
    }
}
