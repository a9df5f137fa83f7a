//! Error types for Verbum

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VerbumError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Book not found: {0}")]
    BookNotFound(String),

    #[error("Chapter not found: {book} {chapter}")]
    ChapterNotFound { book: String, chapter: u32 },

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl VerbumError {
    /// True for the lookup failures navigation recovers from
    pub fn is_missing(&self) -> bool {
        matches!(
            self,
            VerbumError::NotFound(_) | VerbumError::BookNotFound(_) | VerbumError::ChapterNotFound { .. }
        )
    }
}

impl From<rusqlite::Error> for VerbumError {
    fn from(e: rusqlite::Error) -> Self {
        VerbumError::Storage(e.to_string())
    }
}

impl From<reqwest::Error> for VerbumError {
    fn from(e: reqwest::Error) -> Self {
        VerbumError::ExternalService(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, VerbumError>;
