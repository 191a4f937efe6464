use serde::Serialize;
use thiserror::Error;

/// Engine error types, serializable so UI callers can show them to the user.
#[derive(Debug, Clone, Error, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum AppError {
    /// A reminder is configured in a way the engine cannot act on
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// Caller input that does not describe a usable request
    #[error("Validation error: {0}")]
    Validation(String),
    /// Errors reading a fleet snapshot from disk
    #[error("Snapshot error: {0}")]
    Snapshot(String),
    /// Malformed JSON records
    #[error("Parse error: {0}")]
    Parse(String),
}

// Conversion to String for command return types
impl From<AppError> for String {
    fn from(error: AppError) -> Self {
        error.to_string()
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        AppError::parse(error.to_string())
    }
}

// Convenience constructors
impl AppError {
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        AppError::Configuration(msg.into())
    }

    pub fn validation<S: Into<String>>(msg: S) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn snapshot<S: Into<String>>(msg: S) -> Self {
        AppError::Snapshot(msg.into())
    }

    pub fn parse<S: Into<String>>(msg: S) -> Self {
        AppError::Parse(msg.into())
    }
}

/// Result type alias used across the engine
pub type AppResult<T> = Result<T, AppError>;
