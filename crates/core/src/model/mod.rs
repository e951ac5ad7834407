mod ids;
mod level;
mod report;
mod session;
mod status;
mod used_words;
mod word;

pub use ids::{LevelId, ParseIdError, SessionId, WordId};

pub use level::{Level, LevelTier};
pub use report::{PASS_THRESHOLD, SessionReport, StudyMode};
pub use session::Session;
pub use status::UnlockStatus;
pub use used_words::UsedWords;
pub use word::{Difficulty, DifficultyError, Word, WordTemplate};
