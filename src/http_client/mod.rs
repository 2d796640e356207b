//! Instrumented HTTP client
//!
//! Every request sent through a [`TrackedClient`] runs its installed
//! interceptors exactly once on dispatch and exactly once on settlement,
//! whatever the outcome. The [`LoadingInterceptor`] uses those hooks to keep
//! the loading bus's network counter balanced.

pub mod client;
pub mod errors;
pub mod interceptor;
pub mod options;

pub use client::{ApiResponse, TrackedClient, TrackedRequest};
pub use errors::{ApiError, ApiResult};
pub use interceptor::{LoadingInterceptor, Outcome, RequestContext, RequestInterceptor};
pub use options::RequestOptions;
