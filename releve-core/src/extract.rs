//! Parses classified lines into structured transactions.

use chrono::NaiveDate;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::classify::{LineClass, LineClassifier};
use crate::format::{ColumnRanges, detect_format};
use crate::fragment::{Line, LineReconstructor, TextFragment};
use crate::transaction::Transaction;

/// The anchor line carrying the statement's opening balance, whose 4-digit
/// year completes the DD/MM dates of the operation rows.
pub const YEAR_ANCHOR_PATTERN: &str = r"[Aa]ncien solde au.+?([0-9]{4})";

/// Fatal per-document extraction failures. A document that trips one of these
/// yields no transactions; sibling documents in a batch are unaffected.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no opening-balance line found, cannot resolve the statement year")]
    AnchorNotFound,
    #[error("amount {raw:?} is not a signed comma-decimal number")]
    UnparsableAmount { raw: String },
    #[error("{day:02}/{month:02} is not a valid date in {year}")]
    InvalidDate { day: u32, month: u32, year: i32 },
}

/// Walks the reconstructed lines of one document and builds its transactions.
#[derive(Debug)]
pub struct TransactionExtractor {
    classifier: LineClassifier,
    anchor_re: Regex,
}

impl TransactionExtractor {
    pub fn new() -> anyhow::Result<Self> {
        Self::with_classifier(LineClassifier::new()?)
    }

    pub fn with_classifier(classifier: LineClassifier) -> anyhow::Result<Self> {
        Ok(Self {
            classifier,
            anchor_re: Regex::new(YEAR_ANCHOR_PATTERN)?,
        })
    }

    /// Extract transactions from the full line sequence, in document order.
    ///
    /// A document with an anchor but no matching rows is not an error; it
    /// yields an empty list.
    pub fn extract(
        &self,
        lines: &[Line],
        ranges: &ColumnRanges,
    ) -> Result<Vec<Transaction>, ExtractError> {
        let year = self.statement_year(lines)?;
        let mut transactions: Vec<Transaction> = Vec::new();

        for line in lines {
            match self.classifier.classify(line) {
                LineClass::TransactionStart => {
                    if let Some(caps) = self.classifier.row_captures(&line.text) {
                        transactions.push(self.transaction_from_row(&caps, line, year, ranges)?);
                    }
                }
                LineClass::Continuation => {
                    // Folds a wrapped description row back into its transaction.
                    // Continuations before the first start have nothing to
                    // attach to and are dropped.
                    if let Some(last) = transactions.last_mut() {
                        last.description.push('\n');
                        last.description.push_str(&line.text);
                    }
                }
                LineClass::Discard => {}
            }
        }

        debug!(count = transactions.len(), "document extracted");
        Ok(transactions)
    }

    fn statement_year(&self, lines: &[Line]) -> Result<i32, ExtractError> {
        lines
            .iter()
            .find_map(|line| self.anchor_re.captures(&line.text))
            .and_then(|caps| caps.get(1))
            .and_then(|year| year.as_str().parse().ok())
            .ok_or(ExtractError::AnchorNotFound)
    }

    fn transaction_from_row(
        &self,
        caps: &regex::Captures<'_>,
        line: &Line,
        year: i32,
        ranges: &ColumnRanges,
    ) -> Result<Transaction, ExtractError> {
        let day_month = &caps[1];
        let day: u32 = day_month[..2].parse().unwrap_or(0);
        let month: u32 = day_month[3..5].parse().unwrap_or(0);
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or(ExtractError::InvalidDate { day, month, year })?;

        // The amount fragment is the last one appended to the row, so its x
        // tells us which column it was printed in.
        let sign = if ranges.is_debit(line.last_x) {
            -1.0
        } else {
            1.0
        };
        let amount = parse_comma_decimal(&caps[3])? * sign;

        Ok(Transaction {
            date,
            description: caps[2].to_string(),
            amount,
        })
    }
}

/// Parse an amount with internal spaces as digit grouping and a comma as the
/// decimal separator, e.g. `1 234,56` or `-12,30`.
fn parse_comma_decimal(raw: &str) -> Result<f64, ExtractError> {
    raw.replace(' ', "")
        .replace(',', ".")
        .parse()
        .map_err(|_| ExtractError::UnparsableAmount {
            raw: raw.to_string(),
        })
}

/// The whole per-document pipeline: line reconstruction, layout detection,
/// classification, and extraction. Regexes compile once; the pipeline is then
/// reused across the documents of a batch.
#[derive(Debug)]
pub struct StatementPipeline {
    reconstructor: LineReconstructor,
    extractor: TransactionExtractor,
}

impl StatementPipeline {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            reconstructor: LineReconstructor::new(),
            extractor: TransactionExtractor::new()?,
        })
    }

    pub fn extract(&self, fragments: &[TextFragment]) -> Result<Vec<Transaction>, ExtractError> {
        let ranges = detect_format(fragments).column_ranges();
        let lines = self.reconstructor.reconstruct(fragments);
        self.extractor.extract(&lines, &ranges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::StatementFormat;

    fn line(text: &str, x: f64, y: f64, last_x: f64) -> Line {
        Line {
            text: text.to_string(),
            x,
            y,
            last_x,
        }
    }

    fn anchor(y: f64) -> Line {
        line("Ancien solde au 31 décembre 2023", 52.8, y, 52.8)
    }

    fn current_ranges() -> ColumnRanges {
        StatementFormat::WithoutLegacyCurrency.column_ranges()
    }

    #[test]
    fn test_debit_column_makes_amount_negative() {
        let extractor = TransactionExtractor::new().unwrap();
        let lines = vec![
            anchor(700.0),
            line("15/03VIREMENT SALAIRE 1 234,56", 52.8, 680.0, 450.0),
        ];
        let txns = extractor.extract(&lines, &current_ranges()).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].amount, -1234.56);
        assert_eq!(txns[0].description, "VIREMENT SALAIRE");
        assert_eq!(txns[0].date, NaiveDate::from_ymd_opt(2023, 3, 15).unwrap());
    }

    #[test]
    fn test_credit_column_keeps_amount_positive() {
        let extractor = TransactionExtractor::new().unwrap();
        let lines = vec![
            anchor(700.0),
            line("15/03VIREMENT SALAIRE 1 234,56", 52.8, 680.0, 510.0),
        ];
        let txns = extractor.extract(&lines, &current_ranges()).unwrap();
        assert_eq!(txns[0].amount, 1234.56);
    }

    #[test]
    fn test_amount_outside_both_bands_falls_back_to_credit() {
        let extractor = TransactionExtractor::new().unwrap();
        let lines = vec![
            anchor(700.0),
            line("15/03VIREMENT SALAIRE 1 234,56", 52.8, 680.0, 200.0),
        ];
        let txns = extractor.extract(&lines, &current_ranges()).unwrap();
        assert_eq!(txns[0].amount, 1234.56);
    }

    #[test]
    fn test_continuations_fold_in_order() {
        let extractor = TransactionExtractor::new().unwrap();
        let lines = vec![
            anchor(700.0),
            line("15/03CARTE X1234 SUPERMARCHE 45,90", 52.8, 680.0, 460.0),
            line("FACTURE 7733021", 85.92, 660.0, 85.92),
            line("REF CLIENT 42", 89.28, 640.0, 89.28),
        ];
        let txns = extractor.extract(&lines, &current_ranges()).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(
            txns[0].description,
            "CARTE X1234 SUPERMARCHE\nFACTURE 7733021\nREF CLIENT 42"
        );
    }

    #[test]
    fn test_discarded_lines_never_touch_the_open_transaction() {
        let extractor = TransactionExtractor::new().unwrap();
        let lines = vec![
            anchor(700.0),
            line("15/03CARTE X1234 SUPERMARCHE 45,90", 52.8, 680.0, 460.0),
            line("Page 1/3", 300.0, 660.0, 300.0),
        ];
        let txns = extractor.extract(&lines, &current_ranges()).unwrap();
        assert_eq!(txns[0].description, "CARTE X1234 SUPERMARCHE");
    }

    #[test]
    fn test_continuation_before_any_start_is_dropped() {
        let extractor = TransactionExtractor::new().unwrap();
        let lines = vec![anchor(700.0), line("FACTURE 7733021", 85.92, 680.0, 85.92)];
        let txns = extractor.extract(&lines, &current_ranges()).unwrap();
        assert!(txns.is_empty());
    }

    #[test]
    fn test_missing_anchor_is_fatal() {
        let extractor = TransactionExtractor::new().unwrap();
        let lines = vec![line("15/03VIREMENT SALAIRE 1 234,56", 52.8, 680.0, 450.0)];
        let err = extractor.extract(&lines, &current_ranges()).unwrap_err();
        assert!(matches!(err, ExtractError::AnchorNotFound));
    }

    #[test]
    fn test_anchor_with_no_rows_yields_empty_list() {
        let extractor = TransactionExtractor::new().unwrap();
        let lines = vec![anchor(700.0), line("Page 1/1", 300.0, 680.0, 300.0)];
        let txns = extractor.extract(&lines, &current_ranges()).unwrap();
        assert!(txns.is_empty());
    }

    #[test]
    fn test_invalid_calendar_date_is_fatal() {
        let extractor = TransactionExtractor::new().unwrap();
        let lines = vec![
            anchor(700.0),
            line("31/02CARTE X1234 SUPERMARCHE 45,90", 52.8, 680.0, 460.0),
        ];
        let err = extractor.extract(&lines, &current_ranges()).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidDate { day: 31, month: 2, .. }));
    }

    #[test]
    fn test_lowercase_anchor_variant_is_accepted() {
        let extractor = TransactionExtractor::new().unwrap();
        let lines = vec![
            line("ancien solde au 2 janvier 2019", 52.8, 700.0, 52.8),
            line("15/03CARTE X1234 SUPERMARCHE 45,90", 52.8, 680.0, 460.0),
        ];
        let txns = extractor.extract(&lines, &current_ranges()).unwrap();
        assert_eq!(txns[0].date, NaiveDate::from_ymd_opt(2019, 3, 15).unwrap());
    }

    #[test]
    fn test_parse_comma_decimal() {
        assert_eq!(parse_comma_decimal("1 234,56").unwrap(), 1234.56);
        assert_eq!(parse_comma_decimal("-12,30").unwrap(), -12.30);
        assert_eq!(parse_comma_decimal("+7,00").unwrap(), 7.0);
        assert!(parse_comma_decimal("12,3O").is_err());
    }
}
