use thiserror::Error;

/// Centralized error types for the application
///
/// All errors in the application are converted to this enum for consistent
/// error handling. Uses `thiserror` for automatic error conversion and
/// display formatting.
#[derive(Error, Debug)]
pub enum AppError {
    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// IO errors (reading/writing the state file, binding the listener)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted state has invalid JSON syntax
    #[error("State parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Validation errors (bad command input, unknown user)
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
