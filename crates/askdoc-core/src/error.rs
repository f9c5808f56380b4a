//! Workspace error type.

use thiserror::Error;

/// Convenience alias used across the askdoc crates.
pub type Result<T> = std::result::Result<T, AskdocError>;

/// Errors produced by the askdoc crates.
#[derive(Debug, Error)]
pub enum AskdocError {
    /// A required configuration key is missing or empty.
    #[error("🚨 Required environment variable '{0}' is not set or is empty")]
    Config(String),

    /// The source document could not be loaded or parsed.
    #[error("document error: {0}")]
    Document(String),

    /// Splitting or vector-store construction failed.
    #[error("index error: {0}")]
    Index(String),

    /// The model endpoint rejected a request.
    #[error("provider error: {0}")]
    Provider(String),

    /// Transport-level HTTP failure.
    #[error("http error: {0}")]
    Http(String),

    /// Unrecognized menu selection; fatal, never retried.
    #[error("Invalid selection '{0}'. Please restart and choose 1 or 2.")]
    InvalidSelection(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_names_the_key() {
        let err = AskdocError::Config("OPENAI_API_KEY".into());
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: AskdocError = io.into();
        assert!(matches!(err, AskdocError::Io(_)));
    }
}
