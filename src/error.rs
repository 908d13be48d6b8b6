//! Error types and handling for the weather explorer

use thiserror::Error;

/// Main error type for the weather explorer
#[derive(Error, Debug)]
pub enum ExplorerError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// API communication errors (network failures, non-2xx responses, undecodable bodies)
    #[error("API error: {message}")]
    Api { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// A series whose parallel arrays disagree in length with its time axis
    #[error("Malformed series '{series}': column '{column}' has {actual} values, expected {expected}")]
    MalformedSeries {
        series: String,
        column: String,
        expected: usize,
        actual: usize,
    },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl ExplorerError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new malformed-series error
    pub fn malformed_series<S: Into<String>, C: Into<String>>(
        series: S,
        column: C,
        expected: usize,
        actual: usize,
    ) -> Self {
        Self::MalformedSeries {
            series: series.into(),
            column: column.into(),
            expected,
            actual,
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ExplorerError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            ExplorerError::Api { .. } => {
                "Unable to reach the weather service. Please check your internet connection."
                    .to_string()
            }
            ExplorerError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            ExplorerError::MalformedSeries { .. } => {
                "The weather service returned inconsistent forecast data.".to_string()
            }
            ExplorerError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
            ExplorerError::General { message } => message.clone(),
        }
    }
}

impl From<reqwest::Error> for ExplorerError {
    fn from(err: reqwest::Error) -> Self {
        ExplorerError::api(err.to_string())
    }
}

impl From<serde_json::Error> for ExplorerError {
    fn from(err: serde_json::Error) -> Self {
        ExplorerError::api(format!("Failed to decode response: {err}"))
    }
}
