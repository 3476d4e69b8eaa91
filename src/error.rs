use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuizError {
    /// Malformed difficulty template data. Fatal to the session.
    #[error("invalid difficulty template: {0}")]
    Config(String),

    /// A persisted file is missing its header or holds a line we cannot read.
    /// Never repaired automatically.
    #[error("{} is not formed properly ({reason}). Please rename the file, then try again.", path.display())]
    StoreIntegrity { path: PathBuf, reason: String },

    /// Recoverable user input problem; the session does not change state.
    #[error("{0}")]
    InputRejected(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl QuizError {
    pub fn config(msg: impl Into<String>) -> Self {
        QuizError::Config(msg.into())
    }

    pub fn integrity(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        QuizError::StoreIntegrity {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        !matches!(self, QuizError::InputRejected(_))
    }
}

pub type QuizResult<T> = Result<T, QuizError>;
