// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Replica proxy configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid proxy config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid proxy config: {field} must be non-zero")]
    ZeroDuration { field: &'static str },
}

/// Proxy tuning knobs
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProxyConfig {
    /// How long a closed proxy lingers before it may be deleted
    #[serde(with = "humantime_serde")]
    pub cleanup_interval: Duration,
    /// Upper bound for draining executing action lists before close
    #[serde(with = "humantime_serde::option")]
    pub drain_timeout: Option<Duration>,
}

impl ProxyConfig {
    pub fn new() -> Self {
        Self {
            cleanup_interval: Duration::from_secs(15 * 60),
            drain_timeout: None,
        }
    }

    /// Parse a TOML document, filling unspecified fields with defaults
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let config: ProxyConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = Some(timeout);
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.drain_timeout.is_some_and(|t| t.is_zero()) {
            return Err(ConfigError::ZeroDuration {
                field: "drain_timeout",
            });
        }
        Ok(())
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
