//! Application configuration loaded from environment variables.
//!
//! # Configuration Hierarchy
//!
//! All configuration is loaded from environment variables with sensible
//! defaults for development. In production, configure via environment
//! variables or a `.env` file.
//!
//! # Security Configuration
//!
//! - `ALLOWED_API_KEYS`: Comma-separated allow-set of client API keys.
//!   When empty, any *presented* key is accepted, but a key must still be
//!   presented (requests without `X-API-Key` are rejected with 401).
//! - `RATE_LIMIT`: Per-identity fixed-window policy as `count/window`,
//!   e.g. `10/minute` (the default) or `100/hour`.
//!
//! # Provider Configuration
//!
//! - `PROVIDER_API_KEY`: Credential for the completion provider.
//! - `PROVIDER_BASE_URL`: OpenAI-compatible base URL (default: Groq).
//! - `MODEL_NAME`: Model identifier sent with every completion request.

use std::env;
use std::time::Duration;

use crate::error::{AppError, AppResult};
use crate::rate_limit::RatePolicy;

/// Default OpenAI-compatible endpoint (Groq).
const DEFAULT_PROVIDER_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Server host address (default: "0.0.0.0")
    pub host: String,

    /// Server port (default: 8000)
    pub port: u16,

    // =========================================================================
    // Completion Provider Configuration
    // =========================================================================
    /// API key for the completion provider
    pub provider_api_key: String,

    /// OpenAI-compatible base URL of the completion provider
    pub provider_base_url: String,

    /// Model identifier requested from the provider
    pub model_name: String,

    /// Timeout for a single provider call (default: 30 seconds).
    /// A timed-out call is treated like any other transport failure (502).
    pub provider_timeout: Duration,

    /// Sampling temperature for completions (default: 0.1, favoring determinism)
    pub completion_temperature: f32,

    /// Output-token budget per completion (default: 2000)
    pub completion_max_tokens: u32,

    /// Override for the built-in system instruction. The prompt wording is
    /// swappable configuration, not a structural dependency.
    pub system_prompt: Option<String>,

    // =========================================================================
    // Security Configuration
    // =========================================================================
    /// Allow-set of client API keys (empty = any presented key is accepted)
    pub allowed_api_keys: Vec<String>,

    /// Per-identity fixed-window rate policy (default: 10/minute)
    pub rate_limit: RatePolicy,

    /// Comma-separated list of allowed CORS origins
    /// Use "*" to allow all origins (not recommended for production)
    pub cors_allowed_origins: Vec<String>,

    // =========================================================================
    // Request Limits Configuration
    // =========================================================================
    /// Maximum document length in characters (default: 30000)
    pub max_document_chars: usize,

    /// Maximum request body size in bytes (default: 256KB)
    /// Prevents denial-of-service via large payloads
    pub max_request_body_size: usize,

    // =========================================================================
    // Observability Configuration
    // =========================================================================
    /// Log level (e.g., "info", "debug", "trace")
    pub log_level: String,

    /// Port for Prometheus metrics endpoint (default: 9090, 0 = disabled)
    pub metrics_port: u16,
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConfigError` if any value is invalid (non-numeric
    /// PORT, unparseable RATE_LIMIT, out-of-range temperature, ...).
    pub fn from_env() -> AppResult<Self> {
        // Load an .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let config = Self {
            // Server
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: Self::parse_env("PORT", 8000)?,

            // Completion provider
            provider_api_key: env::var("PROVIDER_API_KEY").unwrap_or_default(),
            provider_base_url: env::var("PROVIDER_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_PROVIDER_BASE_URL.to_string()),
            model_name: env::var("MODEL_NAME")
                .unwrap_or_else(|_| "llama-3.3-70b-versatile".to_string()),
            provider_timeout: Duration::from_secs(Self::parse_env("PROVIDER_TIMEOUT_SECS", 30)?),
            completion_temperature: Self::parse_env("COMPLETION_TEMPERATURE", 0.1)?,
            completion_max_tokens: Self::parse_env("COMPLETION_MAX_TOKENS", 2000)?,
            system_prompt: env::var("SYSTEM_PROMPT").ok().filter(|p| !p.is_empty()),

            // Security
            allowed_api_keys: Self::parse_allowed_keys(),
            rate_limit: Self::parse_rate_limit()?,
            cors_allowed_origins: Self::parse_cors_origins(),

            // Request limits
            max_document_chars: Self::parse_env("MAX_DOCUMENT_CHARS", 30000)?,
            max_request_body_size: Self::parse_env("MAX_REQUEST_BODY_SIZE", 256 * 1024)?,

            // Observability
            log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            metrics_port: Self::parse_env("METRICS_PORT", 9090)?,
        };

        // Validate configuration before returning
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values for consistency and correctness.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConfigError` if validation fails.
    fn validate(&self) -> AppResult<()> {
        if self.max_document_chars == 0 {
            return Err(AppError::ConfigError(
                "MAX_DOCUMENT_CHARS must be greater than 0".to_string(),
            ));
        }

        if self.max_request_body_size == 0 {
            return Err(AppError::ConfigError(
                "MAX_REQUEST_BODY_SIZE must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.completion_temperature) {
            return Err(AppError::ConfigError(format!(
                "COMPLETION_TEMPERATURE must be within 0.0..=2.0 (got {})",
                self.completion_temperature
            )));
        }

        if self.completion_max_tokens == 0 {
            return Err(AppError::ConfigError(
                "COMPLETION_MAX_TOKENS must be greater than 0".to_string(),
            ));
        }

        if self.provider_timeout.is_zero() {
            return Err(AppError::ConfigError(
                "PROVIDER_TIMEOUT_SECS must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the full server address for binding.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if the API key allow-set is enforced.
    pub fn auth_enforced(&self) -> bool {
        !self.allowed_api_keys.is_empty()
    }

    /// Check if Prometheus metrics export is enabled.
    pub fn metrics_enabled(&self) -> bool {
        self.metrics_port > 0
    }

    /// Get the metrics endpoint address.
    ///
    /// Returns `None` if metrics are disabled (port = 0).
    pub fn metrics_addr(&self) -> Option<std::net::SocketAddr> {
        if self.metrics_enabled() {
            Some(std::net::SocketAddr::from((
                [0, 0, 0, 0],
                self.metrics_port,
            )))
        } else {
            None
        }
    }

    /// Parse an environment variable into the specified type with a default value.
    fn parse_env<T>(name: &str, default: T) -> AppResult<T>
    where
        T: std::str::FromStr + ToString,
        T::Err: std::fmt::Display,
    {
        match env::var(name) {
            Ok(val) => val
                .parse()
                .map_err(|e| AppError::ConfigError(format!("Invalid {name}: {e}"))),
            Err(_) => Ok(default),
        }
    }

    /// Parse the comma-separated `ALLOWED_API_KEYS` allow-set.
    fn parse_allowed_keys() -> Vec<String> {
        env::var("ALLOWED_API_KEYS")
            .unwrap_or_default()
            .split(',')
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect()
    }

    /// Parse the `RATE_LIMIT` policy string (default: "10/minute").
    fn parse_rate_limit() -> AppResult<RatePolicy> {
        let raw = env::var("RATE_LIMIT").unwrap_or_else(|_| "10/minute".to_string());
        raw.parse()
            .map_err(|e| AppError::ConfigError(format!("Invalid RATE_LIMIT: {e}")))
    }

    /// Parse CORS allowed origins from environment variable.
    fn parse_cors_origins() -> Vec<String> {
        env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Default configuration for testing and development.
///
/// Production deployments should use `Config::from_env()` instead.
impl Default for Config {
    fn default() -> Self {
        Self {
            // Server
            host: "0.0.0.0".to_string(),
            port: 8000,
            // Completion provider
            provider_api_key: String::new(),
            provider_base_url: DEFAULT_PROVIDER_BASE_URL.to_string(),
            model_name: "llama-3.3-70b-versatile".to_string(),
            provider_timeout: Duration::from_secs(30),
            completion_temperature: 0.1,
            completion_max_tokens: 2000,
            system_prompt: None,
            // Security
            allowed_api_keys: vec![],
            rate_limit: RatePolicy::default(),
            cors_allowed_origins: vec!["*".to_string()],
            // Request limits
            max_document_chars: 30000,
            max_request_body_size: 256 * 1024,
            // Observability
            log_level: "info".to_string(),
            metrics_port: 9090,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = Config::default();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.max_document_chars, 30000);
        assert_eq!(config.rate_limit.capacity, 10);
        assert_eq!(config.rate_limit.window, Duration::from_secs(60));
        assert!(config.allowed_api_keys.is_empty());
        assert!(!config.auth_enforced());
    }

    #[test]
    fn test_server_addr_format() {
        let config = Config {
            host: "localhost".to_string(),
            port: 8000,
            ..Config::default()
        };

        assert_eq!(config.server_addr(), "localhost:8000");
    }

    #[test]
    fn test_auth_enforced_with_keys() {
        let config = Config {
            allowed_api_keys: vec!["key-1".to_string()],
            ..Config::default()
        };
        assert!(config.auth_enforced());
    }

    #[test]
    fn test_validate_zero_document_chars() {
        let config = Config {
            max_document_chars: 0,
            ..Config::default()
        };

        let result = config.validate();
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("MAX_DOCUMENT_CHARS")
        );
    }

    #[test]
    fn test_validate_temperature_out_of_range() {
        let config = Config {
            completion_temperature: 3.5,
            ..Config::default()
        };

        let result = config.validate();
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("COMPLETION_TEMPERATURE")
        );
    }

    #[test]
    fn test_validate_zero_provider_timeout() {
        let config = Config {
            provider_timeout: Duration::ZERO,
            ..Config::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_metrics_addr_disabled() {
        let config = Config {
            metrics_port: 0,
            ..Config::default()
        };
        assert!(!config.metrics_enabled());
        assert!(config.metrics_addr().is_none());
    }
}
