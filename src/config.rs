//! SDK configuration
//!
//! Central place to tune the HTTP layer: base URL, request timeout, and
//! retry behavior. Values can be overridden programmatically with the
//! builder methods or via environment variables:
//!
//! - `GAME_API_BASE_URL`
//! - `GAME_REQUEST_TIMEOUT` (seconds)
//! - `GAME_MAX_RETRIES`
//! - `GAME_RETRY_DELAY` (seconds)

use std::env;
use std::time::Duration;

use crate::core::{SdkError, SdkResult};

/// Default base URL for the GAME API
pub const DEFAULT_BASE_URL: &str = "https://api.virtuals.io";

/// Configuration for the GAME SDK
///
/// ```ignore
/// let config = SdkConfig::default()
///     .with_base_url("https://staging.virtuals.io")
///     .with_max_retries(5);
/// ```
#[derive(Debug, Clone)]
pub struct SdkConfig {
    /// Base URL for API calls
    pub base_url: String,

    /// Timeout applied to each request
    pub request_timeout: Duration,

    /// Maximum number of retries for transient failures
    pub max_retries: u32,

    /// Base delay between retries (grows exponentially per attempt)
    pub retry_delay: Duration,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}

impl SdkConfig {
    /// Create a configuration with defaults, then apply environment overrides
    pub fn from_env() -> SdkResult<Self> {
        let mut config = Self::default();

        if let Ok(url) = env::var("GAME_API_BASE_URL") {
            config.base_url = url;
        }
        if let Some(secs) = parse_env_u64("GAME_REQUEST_TIMEOUT")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = parse_env_u64("GAME_MAX_RETRIES")? {
            config.max_retries = retries as u32;
        }
        if let Some(secs) = parse_env_u64("GAME_RETRY_DELAY")? {
            config.retry_delay = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Set the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the per-request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the maximum number of retries for transient failures
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the base retry delay
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }
}

/// Read a numeric environment variable, erroring on malformed values
fn parse_env_u64(name: &str) -> SdkResult<Option<u64>> {
    match env::var(name) {
        Ok(value) => value.parse::<u64>().map(Some).map_err(|_| {
            SdkError::configuration(format!(
                "Invalid value for {}: {}. Must be an integer.",
                name, value
            ))
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = SdkConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay, Duration::from_secs(1));
    }

    #[test]
    fn test_config_builder() {
        let config = SdkConfig::default()
            .with_base_url("https://staging.virtuals.io")
            .with_request_timeout(Duration::from_secs(10))
            .with_max_retries(5)
            .with_retry_delay(Duration::from_secs(2));

        assert_eq!(config.base_url, "https://staging.virtuals.io");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.retry_delay, Duration::from_secs(2));
    }

    // Single test for all env-var behavior: tests run concurrently and the
    // process environment is shared
    #[test]
    fn test_env_overrides() {
        env::set_var("GAME_API_BASE_URL", "https://override.example");
        env::set_var("GAME_REQUEST_TIMEOUT", "7");
        let config = SdkConfig::from_env().unwrap();
        assert_eq!(config.base_url, "https://override.example");
        assert_eq!(config.request_timeout, Duration::from_secs(7));

        env::set_var("GAME_MAX_RETRIES", "not-a-number");
        let result = SdkConfig::from_env();
        assert!(matches!(result, Err(SdkError::Configuration(_))));

        env::remove_var("GAME_API_BASE_URL");
        env::remove_var("GAME_REQUEST_TIMEOUT");
        env::remove_var("GAME_MAX_RETRIES");
    }
}
