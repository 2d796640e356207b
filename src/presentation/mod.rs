//! Presentation adapters driven by the loading bus
//!
//! Adapters own no business state: they keep the latest snapshot plus the
//! timer handles needed for animation, and release both on teardown.

pub mod overlay;
pub mod progress_bar;
pub mod progress_driver;

pub use overlay::{LoadingOverlay, OverlayView, overlay_label};
pub use progress_bar::{ProgressBar, ProgressView};
pub use progress_driver::{ProgressDriver, ProgressSink};
