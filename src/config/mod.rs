//! Configuration module for the blogdesk client
//!
//! This module provides the `ClientConfig` struct and its type-safe builder
//! for configuring the API client, image loading, progress indicator and
//! search debouncing with sensible defaults.

// Sub-modules
pub mod builder;
pub mod types;

// Re-exports for public API
pub use builder::{ClientConfigBuilder, WithBaseUrl};
pub use types::{
    API_BASE_URL_ENV, ClientConfig, ConfigError, DebounceConfig, ImageConfig, ProgressBarConfig,
    REQUEST_TIMEOUT_ENV,
};
