//! Error types for the weather client
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Weather Error Enum ==
/// Unified error type for every fallible client operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WeatherError {
    /// Empty location name or credential. No network call was attempted.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Geocoding returned no match for the location
    #[error("Location not found: {0}")]
    NotFound(String),

    /// Non-success status or undecodable payload from the upstream API
    #[error("Upstream returned status {status}: {message}")]
    Upstream {
        /// HTTP status code returned by the upstream service
        status: u16,
        /// Response body or decode failure description
        message: String,
    },

    /// Timeout, connection failure or interrupted transport
    #[error("Network error: {0}")]
    Network(String),
}

impl WeatherError {
    // == Is Retryable ==
    /// Returns true for failures that may succeed on a later attempt.
    ///
    /// Transport failures and 5xx upstream responses are retryable; invalid
    /// input, unknown locations and 4xx responses are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            WeatherError::Network(_) => true,
            WeatherError::Upstream { status, .. } => *status >= 500,
            WeatherError::InvalidInput(_) | WeatherError::NotFound(_) => false,
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the weather client.
pub type Result<T> = std::result::Result<T, WeatherError>;
