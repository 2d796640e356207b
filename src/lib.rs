//! Global loading instrumentation for a blogging client
//!
//! A [`LoadingBus`] counts outstanding network requests and image loads.
//! [`TrackedClient`] and [`TrackedImage`] feed it; [`ProgressDriver`] and
//! [`LoadingOverlay`] render it.

pub mod api;
pub mod config;
pub mod debounce;
pub mod http_client;
pub mod image_loader;
pub mod loading_bus;
pub mod presentation;
pub mod validation;

pub use api::{BlogApi, Session};
pub use config::{ClientConfig, ConfigError, ProgressBarConfig};
pub use debounce::Debouncer;
pub use http_client::{
    ApiError, ApiResponse, ApiResult, LoadingInterceptor, Outcome, RequestContext,
    RequestInterceptor, RequestOptions, TrackedClient,
};
pub use image_loader::{HttpImageLoader, ImageError, ImageLoader, TrackedImage};
pub use loading_bus::{LoadingBus, LoadingState, PendingKind, Subscription};
pub use presentation::{LoadingOverlay, ProgressBar, ProgressDriver, ProgressView};
