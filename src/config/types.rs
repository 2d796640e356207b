//! Core configuration types for the blogdesk client

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable holding the API base URL
pub const API_BASE_URL_ENV: &str = "BLOGDESK_API";

/// Environment variable overriding the request timeout, in seconds
pub const REQUEST_TIMEOUT_ENV: &str = "BLOGDESK_TIMEOUT_SECS";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Main configuration for the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Root of the REST API, e.g. `https://api.example.com`
    pub(crate) api_base_url: String,
    pub(crate) request_timeout: Duration,
    pub(crate) image: ImageConfig,
    pub(crate) progress: ProgressBarConfig,
    pub(crate) debounce: DebounceConfig,
}

impl ClientConfig {
    /// Load from `BLOGDESK_API` and `BLOGDESK_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self, ConfigError> {
        let base = std::env::var(API_BASE_URL_ENV).map_err(|_| ConfigError::Missing(API_BASE_URL_ENV))?;
        let mut builder = Self::builder().api_base_url(base);
        if let Ok(raw) = std::env::var(REQUEST_TIMEOUT_ENV) {
            let secs: u64 = raw.trim().parse().map_err(|e| ConfigError::Invalid {
                name: REQUEST_TIMEOUT_ENV,
                reason: format!("{e}"),
            })?;
            builder = builder.request_timeout(Duration::from_secs(secs));
        }
        builder.build()
    }

    #[must_use]
    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    #[must_use]
    pub fn image(&self) -> &ImageConfig {
        &self.image
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressBarConfig {
        &self.progress
    }

    #[must_use]
    pub fn debounce(&self) -> &DebounceConfig {
        &self.debounce
    }
}

/// Limits for tracked image downloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageConfig {
    pub timeout: Duration,
    /// Maximum image size in bytes, checked against `Content-Length` and
    /// again while streaming
    pub max_size: usize,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            max_size: 5 * 1024 * 1024,
        }
    }
}

/// Tuning for the top progress bar animation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressBarConfig {
    /// Progress shown as soon as a cycle starts
    pub initial: f64,
    /// Value the animation approaches while work is outstanding
    pub ceiling: f64,
    /// Each tick closes `1 / gap_divisor` of the remaining gap
    pub gap_divisor: f64,
    /// Smallest step per tick
    pub min_step: f64,
    pub tick_interval: Duration,
    /// How long the full bar stays visible after work completes
    pub hide_delay: Duration,
}

impl Default for ProgressBarConfig {
    fn default() -> Self {
        Self {
            initial: 8.0,
            ceiling: 80.0,
            gap_divisor: 20.0,
            min_step: 0.5,
            tick_interval: Duration::from_millis(200),
            hide_delay: Duration::from_millis(300),
        }
    }
}

impl ProgressBarConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::Invalid {
            name: "progress",
            reason: reason.to_string(),
        };
        if !(self.min_step > 0.0) {
            return Err(invalid("min_step must be positive"));
        }
        if !(self.gap_divisor >= 1.0) {
            return Err(invalid("gap_divisor must be at least 1"));
        }
        if !(0.0 <= self.initial && self.initial < self.ceiling - self.min_step) {
            return Err(invalid("initial must lie below ceiling - min_step"));
        }
        if self.ceiling > 100.0 {
            return Err(invalid("ceiling must not exceed 100"));
        }
        if self.tick_interval.is_zero() {
            return Err(invalid("tick_interval must be non-zero"));
        }
        Ok(())
    }
}

/// Quiet periods before a search box fires its query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebounceConfig {
    pub blog_search: Duration,
    pub user_search: Duration,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            blog_search: Duration::from_secs(2),
            user_search: Duration::from_secs(1),
        }
    }
}
