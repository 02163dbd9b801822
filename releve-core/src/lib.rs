//! releve-core: transaction extraction pipeline for French bank-statement
//! PDF text dumps.

pub mod batch;
pub mod classify;
pub mod extract;
pub mod format;
pub mod fragment;
pub mod transaction;

pub use batch::BatchResult;
pub use classify::{ClassifierConfig, LineClass, LineClassifier};
pub use extract::{ExtractError, StatementPipeline, TransactionExtractor};
pub use format::{ColumnRanges, StatementFormat, detect_format};
pub use fragment::{Line, LineReconstructor, TextFragment};
pub use transaction::Transaction;
