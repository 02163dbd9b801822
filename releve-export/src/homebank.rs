//! HomeBank CSV rendering.
//!
//! Format reference: http://homebank.free.fr/help/misc-csvformat.html

use anyhow::Result;
use releve_core::Transaction;

/// Name of the emitted artifact.
pub const OUTPUT_FILE_NAME: &str = "operations.csv";

/// Column layout of a HomeBank CSV import file.
pub const CSV_HEADER: [&str; 8] = [
    "date", "paymode", "info", "payee", "memo", "amount", "category", "tags",
];

/// HomeBank paymode code when no keyword rule matches: debit card.
const PAYMODE_DEFAULT: u8 = 6;

struct PaymodeRule {
    keywords: &'static [&'static str],
    paymode: u8,
}

/// Keyword table mapping descriptions to HomeBank paymode codes. Rules are
/// tried in order and the first match wins, so VIREMENT resolves to bank
/// transfer even when the description also mentions a fee keyword. The bank
/// keeps renaming its fee lines, so this stays data rather than code.
const PAYMODE_RULES: &[PaymodeRule] = &[
    PaymodeRule {
        keywords: &["VIREMENT"],
        paymode: 4, // bank transfer
    },
    PaymodeRule {
        keywords: &["RETRAIT"],
        paymode: 3, // cash withdrawal
    },
    PaymodeRule {
        keywords: &["PRELEVEMENT"],
        paymode: 8, // electronic payment
    },
    PaymodeRule {
        keywords: &[
            "COMMISSION",
            "AVANTAGE TARIFAIRE",
            "REMISE COMMERCIALE",
            "MINIMUM FORFAITAIRE",
        ],
        paymode: 0, // none: account fees and their rebates
    },
];

/// Select the HomeBank paymode for a description by case-insensitive keyword scan.
pub fn paymode(description: &str) -> u8 {
    let upper = description.to_uppercase();
    PAYMODE_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|kw| upper.contains(kw)))
        .map(|rule| rule.paymode)
        .unwrap_or(PAYMODE_DEFAULT)
}

/// Render transactions as one CSV text blob, header row included.
pub fn to_csv(transactions: &[Transaction]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;
    for txn in transactions {
        writer.write_record(&[
            txn.date.format("%m/%d/%Y").to_string(),
            paymode(&txn.description).to_string(),
            String::new(),
            String::new(),
            memo(&txn.description),
            txn.amount.to_string(),
            String::new(),
            String::new(),
        ])?;
    }

    Ok(String::from_utf8(writer.into_inner()?)?)
}

/// Memo field: escape embedded double quotes and flatten multi-row
/// descriptions onto one line.
fn memo(description: &str) -> String {
    description.replace('"', "\\\"").replace('\n', " ")
}
