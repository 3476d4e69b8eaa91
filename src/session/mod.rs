pub mod input;
pub mod quiz;
pub mod result;

pub use quiz::{Continue, Outcome, Phase, QuizSession, ScoreSink};
pub use result::ScoreRecord;
