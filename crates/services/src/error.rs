//! Shared error types for the services crate.

use thiserror::Error;

use persona_core::completion::CompletionStatus;

/// Errors emitted by `AssessmentEngine`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    #[error("assessment is not complete yet: {status}")]
    IncompleteSession { status: CompletionStatus },
    #[error("question index {index} is out of range for {total} questions")]
    QuestionOutOfRange { index: usize, total: usize },
    #[error("failed to serialize export: {0}")]
    Export(#[from] serde_json::Error),
}

/// Returned when parsing an event name that is not `start`, `progress` or `complete`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown event: {name}")]
pub struct UnknownEventError {
    pub name: String,
}
