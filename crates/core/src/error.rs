//! Error types for Katha.
//!
//! This module defines a unified error enum covering every failure kind in
//! the query pipeline, together with the HTTP-style status mapping that the
//! enclosing transport layer uses to render failures.

use thiserror::Error;

/// Unified error type for the Katha query service.
///
/// All functions in the workspace return `Result<T, AppError>`.
/// We never panic — errors must be represented and propagated, and an
/// external-call failure is never swallowed on the way up.
#[derive(Error, Debug)]
pub enum AppError {
    /// The caller submitted no usable query text
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The language model rejected the request due to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// The upstream model service is overloaded or failing internally
    #[error("Upstream unavailable: {0}")]
    Upstream(String),

    /// The document index could not be queried
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// The safety classifier call itself failed
    #[error("Moderation error: {0}")]
    Moderation(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Other language-model provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Prompt template errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// HTTP-style status code for this error, used by the enclosing
    /// transport layer. Missing input is the caller's fault (422); an
    /// unreachable index or overloaded model maps to 503; everything
    /// else is a plain server error.
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::InvalidInput(_) => 422,
            AppError::Upstream(_) | AppError::Retrieval(_) => 503,
            _ => 500,
        }
    }

    /// Whether this error belongs to the client-error status category.
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
