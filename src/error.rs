//! Error types and handling for the `WeatherSite` pipeline

use thiserror::Error;

/// Main error type for the `WeatherSite` application
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WeatherSiteError {
    /// Network, HTTP status or provider status failures
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Provider response is missing or has malformed fields
    #[error("Unexpected response shape: {message}")]
    Shape { message: String },

    /// Lookup requested for an empty query. Callers treat this as a no-op.
    #[error("Empty input")]
    EmptyInput,

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },
}

impl WeatherSiteError {
    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a new response shape error
    pub fn shape<S: Into<String>>(message: S) -> Self {
        Self::Shape {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WeatherSiteError::Transport { .. } => {
                "Unable to reach the place or weather service. Please check your internet connection."
                    .to_string()
            }
            WeatherSiteError::Shape { .. } => {
                "The service returned data that could not be used for this place.".to_string()
            }
            WeatherSiteError::EmptyInput => "Type a place name to search.".to_string(),
            WeatherSiteError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            WeatherSiteError::Validation { message } => {
                format!("Invalid input: {message}")
            }
        }
    }
}

impl From<reqwest::Error> for WeatherSiteError {
    fn from(err: reqwest::Error) -> Self {
        // Strip the URL so API keys in query strings never reach error messages.
        WeatherSiteError::transport(err.without_url().to_string())
    }
}
