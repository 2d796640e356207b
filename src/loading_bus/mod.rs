//! Global loading coordination
//!
//! This module provides the reference-counted loading bus that tracks
//! in-flight network requests and image loads across the whole client and
//! notifies presentation adapters whenever the pending counts change.

// Sub-modules
mod core;
pub mod metrics;
mod subscription;
pub mod types;

// Re-exports for public API
pub use self::core::LoadingBus;
pub use metrics::{BusMetrics, BusMetricsSnapshot};
pub use subscription::Subscription;
pub use types::{LoadingState, PendingKind};
