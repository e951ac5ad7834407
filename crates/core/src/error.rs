use thiserror::Error;

use crate::curriculum::CurriculumError;
use crate::diagnostic::DiagnosticError;
use crate::model::DifficultyError;
use crate::progression::ProgressionError;
use crate::quiz::QuizError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Difficulty(#[from] DifficultyError),
    #[error(transparent)]
    Curriculum(#[from] CurriculumError),
    #[error(transparent)]
    Progression(#[from] ProgressionError),
    #[error(transparent)]
    Diagnostic(#[from] DiagnosticError),
    #[error(transparent)]
    Quiz(#[from] QuizError),
}
