//! Error types for the retrieval service

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Service error taxonomy
///
/// Extraction failures are deliberately absent: the LLM extraction helpers
/// degrade to empty results instead of returning an error, so a request never
/// fails solely because extraction failed.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid configuration (fatal, raised on first use)
    #[error("configuration error: {0}")]
    Config(String),

    /// Store persistence failure (write path only; load failures degrade to empty)
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Embedding backend failure
    #[error("embedding error: {0}")]
    Embedding(String),

    /// LLM chat-completion failure
    #[error("llm error: {0}")]
    Llm(String),

    /// Anything else
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Persistence(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Persistence(e.to_string())
    }
}
