pub mod distractor;
pub mod question;

pub use question::{AnswerChoices, Letter, Question, generate};
