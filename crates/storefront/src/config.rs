//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TIENDA_API_URL` - Base URL of the order gateway REST API
//!
//! ## Optional
//! - `TIENDA_HTTP_TIMEOUT_SECS` - Per-request timeout in seconds
//!   (default: 30)

use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default per-request timeout, matching what the gateway's own clients
/// historically used.
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL of the order gateway REST API.
    pub api_url: Url,
    /// Bounded timeout applied to every gateway request. A stalled
    /// request surfaces as a network error instead of hanging the
    /// checkout indefinitely.
    pub http_timeout: Duration,
}

impl StorefrontConfig {
    /// Create a configuration with the default timeout.
    #[must_use]
    pub const fn new(api_url: Url) -> Self {
        Self {
            api_url,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or
    /// invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = get_required_env("TIENDA_API_URL")?;
        let api_url = Url::parse(&api_url).map_err(|e| {
            ConfigError::InvalidEnvVar("TIENDA_API_URL".to_string(), e.to_string())
        })?;

        let http_timeout = match get_optional_env("TIENDA_HTTP_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.parse::<u64>().map_err(|e| {
                    ConfigError::InvalidEnvVar(
                        "TIENDA_HTTP_TIMEOUT_SECS".to_string(),
                        e.to_string(),
                    )
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        Ok(Self {
            api_url,
            http_timeout,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating empty strings as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_default_timeout() {
        let config = StorefrontConfig::new(Url::parse("http://localhost:8000/api").unwrap());
        assert_eq!(config.http_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_missing_env_var_error_display() {
        let err = ConfigError::MissingEnvVar("TIENDA_API_URL".to_string());
        assert_eq!(
            err.to_string(),
            "Missing environment variable: TIENDA_API_URL"
        );
    }
}
