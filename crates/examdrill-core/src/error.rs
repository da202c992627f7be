//! Engine and store error types.
//!
//! Defined in `examdrill-core` so the session engine and every store
//! backend share one vocabulary for failures; callers match on variants
//! instead of string matching.

use thiserror::Error;

use crate::model::QuestionId;

/// Errors from answer-store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing storage failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding an answer set for persistence failed.
    #[error("failed to encode answers: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Errors from the session engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No question with the requested id exists in the bank.
    #[error("question not found: {0}")]
    QuestionNotFound(QuestionId),

    /// The bank's visible range holds no questions.
    #[error("bank has no visible questions")]
    EmptyBank,

    /// The submit guard rejected the current answer set.
    #[error("answers incomplete for question {0}")]
    IncompleteAnswers(QuestionId),

    /// An operation that needs an active question ran at the results stage.
    #[error("session is at the results stage")]
    SessionFinished,

    /// A store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
