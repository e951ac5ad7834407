mod progress;
mod quiz;
mod study;

// Public API of the session subsystem.
pub use crate::error::StudyError;
pub use progress::SessionProgress;
pub use quiz::{QuizAnswer, QuizQuestion, QuizRun};
pub use study::{StudyRating, StudyRun};
