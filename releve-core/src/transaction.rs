//! The extracted transaction model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One statement operation. Immutable once extraction has completed; the
/// description may span several statement rows, joined by `\n`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub description: String,
    /// Negative for debits, positive for credits.
    pub amount: f64,
}

impl Transaction {
    /// Returns true if this is a debit (negative amount).
    pub fn is_debit(&self) -> bool {
        self.amount < 0.0
    }

    /// Returns true if this is a credit (positive amount).
    pub fn is_credit(&self) -> bool {
        self.amount > 0.0
    }
}
