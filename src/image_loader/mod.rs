//! Tracked image loading
//!
//! A [`TrackedImage`] is one logical image slot. Every source it is asked to
//! show counts once on the loading bus's image counter until that load
//! settles, while only the latest source is allowed to change what the slot
//! displays.

pub mod loader;
pub mod tracked_image;

pub use loader::{HttpImageLoader, ImageError, ImageFuture, ImageLoader, LoadedImage};
pub use tracked_image::{ImageLoadTicket, ImageStatus, ImageView, Settlement, TrackedImage};
