//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use vocab_core::curriculum::CurriculumError;
use vocab_core::diagnostic::DiagnosticError;
use vocab_core::progression::ProgressionError;
use vocab_core::quiz::QuizError;

/// Errors emitted by the word generation port and its adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerationError {
    #[error("word generation is not configured")]
    Disabled,
    #[error("word generation returned an empty response")]
    EmptyResponse,
    #[error("word generation failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("word generation service reported: {0}")]
    Remote(String),
    #[error("generated text is not a word list: {0}")]
    Malformed(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by `CurriculumService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CurriculumServiceError {
    #[error(transparent)]
    Curriculum(#[from] CurriculumError),
    #[error(transparent)]
    Progression(#[from] ProgressionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}

/// Errors emitted by study, quiz and diagnostic runs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StudyError {
    #[error("no words available for session")]
    Empty,
    #[error("session already completed")]
    Completed,
    #[error("session still has unanswered words")]
    Unfinished,
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Diagnostic(#[from] DiagnosticError),
}
