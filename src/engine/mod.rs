pub mod difficulty;
pub mod scoring;

pub use difficulty::{Difficulty, DifficultyCatalog, DifficultyTemplate, Operator, TemplateSet};
