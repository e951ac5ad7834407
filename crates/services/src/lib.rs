#![forbid(unsafe_code)]

pub mod curriculum_service;
pub mod error;
pub mod generation;
pub mod sessions;
pub mod word_source;

pub use vocab_core::Clock;

pub use curriculum_service::CurriculumService;
pub use error::{CurriculumServiceError, GenerationError, StudyError};
pub use generation::{GeneratorConfig, HttpTextGenerator, TextGenerator};
pub use sessions::{QuizAnswer, QuizQuestion, QuizRun, SessionProgress, StudyRating, StudyRun};
pub use word_source::{SessionWords, WordOrigin, WordSource};
