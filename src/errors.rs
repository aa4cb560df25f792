//! Error taxonomy for the scoring pipeline.
//!
//! Malformed records are not errors — the cleaner drops and counts them.
//! "Cannot compute" statistics are `None`, not errors. What remains is the
//! per-trader failure class: anything here fails one trader's computation
//! and is skipped with a warning, never the whole batch.

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Decimal arithmetic overflowed while rolling up a trader's records.
    #[error("numeric overflow while aggregating trader {wallet}")]
    NumericOverflow { wallet: String },

    /// A worker task for one trader panicked or was cancelled.
    #[error("worker task failed for trader {wallet}: {source}")]
    WorkerFailed {
        wallet: String,
        #[source]
        source: tokio::task::JoinError,
    },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
