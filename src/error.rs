//! Error types for the codelang library.
//!
//! All fallible operations return [`Result`], whose error type is the
//! [`CodelangError`] enum.
//!
//! # Examples
//!
//! ```
//! use codelang::error::{CodelangError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(CodelangError::invalid_input("empty document"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for codelang operations.
#[derive(Error, Debug)]
pub enum CodelangError {
    /// I/O errors (reading corpora, writing models, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A document or argument that cannot be processed (unreadable, empty, malformed).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A persisted model whose format, version or structure does not match
    /// what this build expects.
    #[error("Vocabulary mismatch: {0}")]
    VocabularyMismatch(String),

    /// The additive smoothing constant is not strictly positive.
    #[error("Smoothing configuration error: alpha must be > 0, got {0}")]
    SmoothingConfig(f64),

    /// Analysis-related errors (normalization rules, tokenizer patterns).
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Invalid configuration values.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regex compilation errors
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with CodelangError.
pub type Result<T> = std::result::Result<T, CodelangError>;

impl CodelangError {
    /// Create a new invalid input error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        CodelangError::InvalidInput(msg.into())
    }

    /// Create a new vocabulary mismatch error.
    pub fn vocabulary_mismatch<S: Into<String>>(msg: S) -> Self {
        CodelangError::VocabularyMismatch(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        CodelangError::Analysis(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        CodelangError::Config(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        CodelangError::Other(msg.into())
    }

    /// Create a new internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        CodelangError::Other(format!("Internal error: {}", msg.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = CodelangError::invalid_input("empty file");
        assert_eq!(error.to_string(), "Invalid input: empty file");

        let error = CodelangError::vocabulary_mismatch("version 2 != 1");
        assert_eq!(error.to_string(), "Vocabulary mismatch: version 2 != 1");

        let error = CodelangError::SmoothingConfig(0.0);
        assert_eq!(
            error.to_string(),
            "Smoothing configuration error: alpha must be > 0, got 0"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = CodelangError::from(io_error);

        match error {
            CodelangError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
    }
}
