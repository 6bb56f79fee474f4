// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// Queue store read/write failure. Fatal when raised while loading a snapshot.
    #[error("Queue store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

// Note: sqlx::Error and reqwest::Error conversions live in the adapter crates
// (map_sqlx_error / map_http_error) because of the orphan rule.
