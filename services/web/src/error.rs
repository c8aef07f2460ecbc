//! services/web/src/error.rs
//!
//! Defines the primary error type for the web service.

use crate::config::ConfigError;

/// The primary error type for the `web` service.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error from the HTTP client talking to the backend.
    #[error("Backend HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_convert_with_context() {
        let err: AppError = ConfigError::MissingVar("SUPABASE_URL".to_string()).into();
        assert!(matches!(err, AppError::Config(_)));
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing the environment variable SUPABASE_URL"
        );
    }
}
