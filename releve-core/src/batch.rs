//! Batch coordination: one pipeline run per document, failures isolated.

use tracing::{info, warn};

use crate::extract::StatementPipeline;
use crate::fragment::TextFragment;
use crate::transaction::Transaction;

/// Accumulated outcome of a multi-document run. Documents are independent
/// units of failure: one malformed statement never blocks its siblings.
#[derive(Debug, Default)]
pub struct BatchResult {
    /// Transactions of all successful documents, concatenated in input order.
    pub transactions: Vec<Transaction>,
    /// Per-document failures, keyed by the caller's document identifier.
    pub errors: Vec<(String, anyhow::Error)>,
}

/// Run the pipeline once per document.
///
/// Each entry pairs a document identifier with the already-loaded fragment
/// stream (or the error loading it produced, which is recorded like an
/// extraction failure). `progress` receives the completed fraction after each
/// document and is therefore monotonic.
pub fn run(
    documents: Vec<(String, anyhow::Result<Vec<TextFragment>>)>,
    mut progress: impl FnMut(f64),
) -> anyhow::Result<BatchResult> {
    let pipeline = StatementPipeline::new()?;
    let total = documents.len();
    let mut result = BatchResult::default();

    for (done, (id, loaded)) in documents.into_iter().enumerate() {
        match loaded.and_then(|fragments| pipeline.extract(&fragments).map_err(Into::into)) {
            Ok(transactions) => {
                info!(document = %id, count = transactions.len(), "document extracted");
                result.transactions.extend(transactions);
            }
            Err(err) => {
                warn!(document = %id, error = %err, "document failed");
                result.errors.push((id, err));
            }
        }
        progress((done + 1) as f64 / total as f64);
    }

    Ok(result)
}
