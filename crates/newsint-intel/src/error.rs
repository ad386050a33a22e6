use thiserror::Error;

use newsint_db::DbError;

/// Collaborator-level failures. These never surface from the pipeline:
/// every call site degrades to a documented default instead.
#[derive(Debug, Error)]
pub enum IntelError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("embedding service error: {0}")]
    Embedding(String),

    #[error("completion service error: {0}")]
    Completion(String),
}

/// Failures that abort an ingestion, search, or answer request.
///
/// Collaborator errors are absent here: embedding and model calls fall back
/// to degraded defaults. Only malformed input and storage failures abort.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Db(#[from] DbError),
}
