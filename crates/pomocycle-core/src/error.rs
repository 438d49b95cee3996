//! Core error types for pomocycle-core.
//!
//! This module defines the error hierarchy using thiserror. The only error a
//! timer operation can produce is [`CoreError::InvalidConfiguration`]; the
//! remaining variants belong to the storage layer.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pomocycle-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A timer setting was zero, negative or not an integer.
    #[error("Invalid configuration for '{field}': {value} (must be a positive integer)")]
    InvalidConfiguration { field: String, value: String },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML encoding errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),
}

impl CoreError {
    pub fn invalid_configuration(field: impl Into<String>, value: impl ToString) -> Self {
        CoreError::InvalidConfiguration {
            field: field.into(),
            value: value.to_string(),
        }
    }

    /// True for the one error kind the controller itself can raise.
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(self, CoreError::InvalidConfiguration { .. })
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_configuration_message_names_field() {
        let err = CoreError::invalid_configuration("work_duration", 0);
        assert!(err.is_invalid_configuration());
        assert_eq!(
            err.to_string(),
            "Invalid configuration for 'work_duration': 0 (must be a positive integer)"
        );
    }

    #[test]
    fn config_errors_are_not_invalid_configuration() {
        let err: CoreError = ConfigError::UnknownKey("timer.nope".into()).into();
        assert!(!err.is_invalid_configuration());
        assert!(err.to_string().contains("timer.nope"));
    }
}
