//! SDK error types
//!
//! Every failure surfaced by the SDK maps onto one of these variants, so
//! callers can distinguish authentication problems from validation problems
//! from transient network conditions. Transient variants carry enough
//! information for the client's retry loop to pick a sensible delay.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur in the GAME SDK
#[derive(Error, Debug)]
pub enum SdkError {
    /// API key was rejected (HTTP 401)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Request was rejected as invalid (HTTP 400 or local validation)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded: {message}")]
    RateLimited {
        /// Error message from the API
        message: String,
        /// Suggested delay from the Retry-After header, if present
        retry_after: Option<Duration>,
    },

    /// Server-side error (HTTP 5xx)
    #[error("Server error (HTTP {status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Connection failure or timeout
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body could not be interpreted (malformed JSON, missing fields)
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid SDK configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Bookkeeping failure around workers, functions, or state
    #[error("State error: {0}")]
    State(String),
}

impl SdkError {
    /// Create a validation error from a string
    pub fn validation(msg: impl Into<String>) -> Self {
        SdkError::Validation(msg.into())
    }

    /// Create a configuration error from a string
    pub fn configuration(msg: impl Into<String>) -> Self {
        SdkError::Configuration(msg.into())
    }

    /// Create a state error from a string
    pub fn state(msg: impl Into<String>) -> Self {
        SdkError::State(msg.into())
    }

    /// Build the error for an HTTP error status and response body
    ///
    /// 401 maps to `Authentication`, 400 to `Validation`, 429 to
    /// `RateLimited`, and anything else to `Server`.
    pub fn from_status(status: u16, message: String, retry_after: Option<Duration>) -> Self {
        match status {
            401 => SdkError::Authentication(message),
            400 => SdkError::Validation(message),
            429 => SdkError::RateLimited {
                message,
                retry_after,
            },
            _ => SdkError::Server { status, message },
        }
    }

    /// The HTTP status code associated with this error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            SdkError::Authentication(_) => Some(401),
            SdkError::Validation(_) => Some(400),
            SdkError::RateLimited { .. } => Some(429),
            SdkError::Server { status, .. } => Some(*status),
            SdkError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if this error is transient and worth retrying
    ///
    /// Rate limits, server errors, and network failures are transient.
    /// Authentication and validation failures will not succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SdkError::RateLimited { .. } | SdkError::Server { .. } | SdkError::Network(_)
        )
    }

    /// Suggested delay before the given retry attempt
    ///
    /// A `Retry-After` header takes priority. Otherwise the delay grows
    /// exponentially from a per-kind base, capped at 60 seconds.
    pub fn suggested_delay(&self, attempt: u32) -> Duration {
        if let SdkError::RateLimited {
            retry_after: Some(retry_after),
            ..
        } = self
        {
            return *retry_after;
        }

        let base_secs: u64 = match self {
            // Rate limits start higher: the window has to drain
            SdkError::RateLimited { .. } => 5,
            SdkError::Server { .. } => 2,
            _ => 1,
        };

        let delay_secs = base_secs.saturating_mul(2u64.saturating_pow(attempt));
        Duration::from_secs(delay_secs.min(60))
    }
}

/// Result type alias for SDK operations
pub type SdkResult<T> = Result<T, SdkError>;
