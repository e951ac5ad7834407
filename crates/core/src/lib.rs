#![forbid(unsafe_code)]

pub mod curriculum;
pub mod diagnostic;
pub mod due;
pub mod error;
pub mod model;
pub mod progression;
pub mod quiz;
pub mod scheduler;
pub mod time;

pub use error::Error;
pub use progression::Curriculum;
pub use time::Clock;
