//! # Testflow Configuration
//!
//! Typed configuration for the correlation store, retry containers and
//! logging. Values come from optional YAML files plus environment overrides,
//! see [`ConfigManager`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use testflow::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let polling = manager.config().correlation.polling_interval();
//! # Ok(())
//! # }
//! ```

pub mod loader;

use crate::constants::defaults;
use crate::error::{Result, TestflowError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use loader::ConfigManager;

/// Root configuration structure mirroring testflow.yaml
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TestflowConfig {
    /// Correlation store polling behaviour
    pub correlation: CorrelationConfig,

    /// Container execution defaults
    pub execution: ExecutionConfig,

    /// Logging output
    pub logging: LoggingConfig,
}

impl TestflowConfig {
    /// Reject values the runtime cannot honour
    pub fn validate(&self) -> Result<()> {
        if self.correlation.polling_interval_ms == 0 {
            return Err(TestflowError::InvalidConfiguration(
                "correlation.polling_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.execution.backoff_multiplier < 1.0 {
            return Err(TestflowError::InvalidConfiguration(format!(
                "execution.backoff_multiplier must be at least 1.0, got {}",
                self.execution.backoff_multiplier
            )));
        }
        if self.execution.max_auto_sleep_ms < self.execution.default_auto_sleep_ms {
            return Err(TestflowError::InvalidConfiguration(format!(
                "execution.max_auto_sleep_ms ({}) is below default_auto_sleep_ms ({})",
                self.execution.max_auto_sleep_ms, self.execution.default_auto_sleep_ms
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CorrelationConfig {
    pub polling_interval_ms: u64,
    pub default_timeout_ms: u64,
    pub retry_message: String,
}

impl CorrelationConfig {
    pub fn polling_interval(&self) -> Duration {
        Duration::from_millis(self.polling_interval_ms)
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            polling_interval_ms: defaults::CORRELATION_POLLING_INTERVAL_MS,
            default_timeout_ms: defaults::CORRELATION_TIMEOUT_MS,
            retry_message: defaults::CORRELATION_RETRY_MESSAGE.to_string(),
        }
    }
}

/// Defaults applied to RepeatOnErrorUntilTrue containers built from config
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ExecutionConfig {
    pub default_auto_sleep_ms: u64,
    pub backoff_multiplier: f64,
    pub max_auto_sleep_ms: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            default_auto_sleep_ms: defaults::AUTO_SLEEP_MS,
            backoff_multiplier: defaults::BACKOFF_MULTIPLIER,
            max_auto_sleep_ms: defaults::MAX_AUTO_SLEEP_MS,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, `None` derives one from the environment
    pub level: Option<String>,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: None,
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = TestflowConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.correlation.polling_interval(), Duration::from_millis(500));
        assert_eq!(config.correlation.default_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_zero_polling_interval_rejected() {
        let mut config = TestflowConfig::default();
        config.correlation.polling_interval_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(TestflowError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_multiplier_below_one_rejected() {
        let mut config = TestflowConfig::default();
        config.execution.backoff_multiplier = 0.5;
        assert!(config.validate().is_err());
    }
}
