//! Gateway configuration with validation.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Main gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Identity resolution configuration
    pub auth: AuthConfig,
    /// Field redaction configuration
    pub redact: RedactConfig,
    /// Request batch limits
    pub limits: LimitsConfig,
}

impl GatewayConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.resolve_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "auth.resolve_timeout cannot be 0".into(),
            ));
        }
        if self.limits.max_subscriptions_per_request == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_subscriptions_per_request cannot be 0".into(),
            ));
        }
        if self.limits.max_methods_per_request == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_methods_per_request cannot be 0".into(),
            ));
        }
        Ok(())
    }
}

/// Identity resolution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Hard bound on one resolver call; expiry is a fatal failure, not a
    /// silent downgrade to anonymous.
    pub resolve_timeout: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            resolve_timeout: Duration::from_secs(5),
        }
    }
}

/// Field redaction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedactConfig {
    /// Top-level fields stripped from every published document.
    pub fields: Vec<String>,
}

impl Default for RedactConfig {
    fn default() -> Self {
        Self {
            fields: vec!["password".to_string(), "services".to_string()],
        }
    }
}

/// Request batch limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum subscriptions in one sync request.
    pub max_subscriptions_per_request: usize,
    /// Maximum method calls in one sync request.
    pub max_methods_per_request: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_subscriptions_per_request: 32,
            max_methods_per_request: 32,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),

    #[error("Invalid limit: {0}")]
    InvalidLimit(String),
}
