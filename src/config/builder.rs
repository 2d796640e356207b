//! Type-safe builder for `ClientConfig` using the typestate pattern
//!
//! `build()` only exists once the API base URL has been supplied.

use std::marker::PhantomData;
use std::time::Duration;
use url::Url;

use super::types::{ClientConfig, ConfigError, DebounceConfig, ImageConfig, ProgressBarConfig};
use crate::http_client::client::DEFAULT_REQUEST_TIMEOUT;

// Type states for the builder
pub struct WithBaseUrl;

pub struct ClientConfigBuilder<State = ()> {
    api_base_url: Option<String>,
    request_timeout: Duration,
    image: ImageConfig,
    progress: ProgressBarConfig,
    debounce: DebounceConfig,
    _phantom: PhantomData<State>,
}

impl Default for ClientConfigBuilder<()> {
    fn default() -> Self {
        Self {
            api_base_url: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            image: ImageConfig::default(),
            progress: ProgressBarConfig::default(),
            debounce: DebounceConfig::default(),
            _phantom: PhantomData,
        }
    }
}

impl ClientConfig {
    #[must_use]
    pub fn builder() -> ClientConfigBuilder<()> {
        ClientConfigBuilder::default()
    }
}

impl<State> ClientConfigBuilder<State> {
    fn transition<Next>(self) -> ClientConfigBuilder<Next> {
        ClientConfigBuilder {
            api_base_url: self.api_base_url,
            request_timeout: self.request_timeout,
            image: self.image,
            progress: self.progress,
            debounce: self.debounce,
            _phantom: PhantomData,
        }
    }

    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn image(mut self, image: ImageConfig) -> Self {
        self.image = image;
        self
    }

    #[must_use]
    pub fn progress(mut self, progress: ProgressBarConfig) -> Self {
        self.progress = progress;
        self
    }

    #[must_use]
    pub fn debounce(mut self, debounce: DebounceConfig) -> Self {
        self.debounce = debounce;
        self
    }
}

impl ClientConfigBuilder<()> {
    #[must_use]
    pub fn api_base_url(mut self, url: impl Into<String>) -> ClientConfigBuilder<WithBaseUrl> {
        self.api_base_url = Some(url.into());
        self.transition()
    }
}

impl ClientConfigBuilder<WithBaseUrl> {
    /// Validate and build the configuration
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let raw = self
            .api_base_url
            .ok_or(ConfigError::Missing("api_base_url"))?;
        let trimmed = raw.trim().trim_end_matches('/').to_string();
        let parsed = Url::parse(&trimmed).map_err(|e| ConfigError::Invalid {
            name: "api_base_url",
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                name: "api_base_url",
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                name: "request_timeout",
                reason: "must be non-zero".to_string(),
            });
        }
        self.progress.validate()?;

        Ok(ClientConfig {
            api_base_url: trimmed,
            request_timeout: self.request_timeout,
            image: self.image,
            progress: self.progress,
            debounce: self.debounce,
        })
    }
}
