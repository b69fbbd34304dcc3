//! Checkout orchestration configuration.
//! Handles environment variable loading, validation, and timing defaults.

use crate::services::retry::RetryPolicy;
use std::env;
use std::time::Duration;

/// Timing knobs for the payment-intent orchestrator. Defaults match the
/// production checkout behavior; every field can be overridden from the
/// environment.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Minimum gap between accepted submit attempts, in milliseconds.
    pub debounce_interval_ms: u64,
    /// Upper bound on a single create-intent dispatch, in seconds.
    pub request_timeout_secs: u64,
    /// Upper bound on the confirmation step, in seconds.
    pub confirm_timeout_secs: u64,
    /// Base backoff delay, in milliseconds.
    pub base_retry_delay_ms: u64,
    /// Maximum automatic retries after the initial attempt.
    pub max_retries: u32,
    /// Exclusive upper bound on backoff jitter, in milliseconds.
    pub retry_jitter_cap_ms: u64,
    /// Cool-down after the retry budget is exhausted, in seconds.
    pub retry_cooldown_secs: u64,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            debounce_interval_ms: 2000,
            request_timeout_secs: 30,
            confirm_timeout_secs: 30,
            base_retry_delay_ms: 2000,
            max_retries: 3,
            retry_jitter_cap_ms: 1000,
            retry_cooldown_secs: 30,
        }
    }
}

impl CheckoutConfig {
    /// Load configuration from environment variables, falling back to the
    /// defaults above.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        let _ = dotenv::dotenv().ok();

        let config = Self {
            debounce_interval_ms: read_var("CHECKOUT_DEBOUNCE_MS", 2000)?,
            request_timeout_secs: read_var("CHECKOUT_REQUEST_TIMEOUT_SECS", 30)?,
            confirm_timeout_secs: read_var("CHECKOUT_CONFIRM_TIMEOUT_SECS", 30)?,
            base_retry_delay_ms: read_var("CHECKOUT_BASE_RETRY_DELAY_MS", 2000)?,
            max_retries: read_var("CHECKOUT_MAX_RETRIES", 3)?,
            retry_jitter_cap_ms: read_var("CHECKOUT_RETRY_JITTER_CAP_MS", 1000)?,
            retry_cooldown_secs: read_var("CHECKOUT_RETRY_COOLDOWN_SECS", 30)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "CHECKOUT_REQUEST_TIMEOUT_SECS cannot be 0".to_string(),
            ));
        }
        if self.confirm_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "CHECKOUT_CONFIRM_TIMEOUT_SECS cannot be 0".to_string(),
            ));
        }
        if self.base_retry_delay_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "CHECKOUT_BASE_RETRY_DELAY_MS cannot be 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn debounce_interval(&self) -> Duration {
        Duration::from_millis(self.debounce_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_secs(self.confirm_timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            base_delay: Duration::from_millis(self.base_retry_delay_ms),
            max_retries: self.max_retries,
            jitter_cap: Duration::from_millis(self.retry_jitter_cap_ms),
            cooldown: Duration::from_secs(self.retry_cooldown_secs),
        }
    }
}

fn read_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        Err(_) => Ok(default),
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),

    #[error("Invalid value for configuration: {0}")]
    InvalidValue(String),
}
