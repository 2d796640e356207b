//! Image slots whose loads are counted on the loading bus

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::JoinHandle;

use super::loader::{ImageError, ImageLoader, LoadedImage};
use crate::loading_bus::LoadingBus;

/// Label shown in place of an image that failed to load
pub const IMAGE_ERROR_LABEL: &str = "Image failed to load";

/// What an image slot currently displays
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImageStatus {
    /// No source has been set
    #[default]
    Idle,
    Pending {
        src: String,
    },
    Loaded {
        src: String,
        image: Arc<LoadedImage>,
    },
    Failed {
        src: String,
        reason: String,
    },
}

impl ImageStatus {
    #[must_use]
    pub fn src(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Pending { src } | Self::Loaded { src, .. } | Self::Failed { src, .. } => Some(src),
        }
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Render model for one image slot
#[derive(Debug, Clone, PartialEq)]
pub struct ImageView {
    pub src: Option<String>,
    /// Spinner placeholder while the current source is pending
    pub show_placeholder: bool,
    /// Fade target: 1.0 once loaded, 0.0 otherwise
    pub opacity: f32,
    pub error_label: Option<&'static str>,
}

/// Whether a settled load changed what the slot shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// The load was for the slot's latest source
    Applied,
    /// A newer source superseded this load; only the counter was adjusted
    Stale,
}

#[derive(Debug, Default)]
struct Slot {
    /// Sequence number of the latest load; older tickets are stale
    seq: u64,
    status: ImageStatus,
}

/// One logical image slot, e.g. a blog cover or an avatar.
///
/// Clones refer to the same slot.
#[derive(Debug, Clone)]
pub struct TrackedImage {
    bus: LoadingBus,
    slot: Arc<Mutex<Slot>>,
}

impl TrackedImage {
    #[must_use]
    pub fn new(bus: &LoadingBus) -> Self {
        Self {
            bus: bus.clone(),
            slot: Arc::new(Mutex::new(Slot::default())),
        }
    }

    /// Point the slot at `src` and start counting its load.
    ///
    /// Returns `None` without touching the bus when `src` is empty or is
    /// already the slot's source. Otherwise the image counter is incremented
    /// immediately and the returned ticket owns the matching decrement.
    pub fn set_source(&self, src: &str) -> Option<ImageLoadTicket> {
        if src.is_empty() {
            return None;
        }
        let seq = {
            let mut slot = self.slot.lock();
            if slot.status.src() == Some(src) {
                return None;
            }
            slot.seq += 1;
            slot.status = ImageStatus::Pending {
                src: src.to_string(),
            };
            slot.seq
        };
        self.bus.increment_image();
        log::trace!("image slot load #{seq} started: {src}");
        Some(ImageLoadTicket {
            bus: self.bus.clone(),
            slot: Arc::clone(&self.slot),
            seq,
            src: src.to_string(),
            settled: false,
        })
    }

    /// Set `src` and load it with `loader` on the current task
    pub async fn load<L>(&self, loader: &L, src: &str) -> Option<Settlement>
    where
        L: ImageLoader + ?Sized,
    {
        let ticket = self.set_source(src)?;
        Some(ticket.complete(loader.load(src).await))
    }

    /// Set `src` and load it on a tokio task.
    ///
    /// The counter is incremented before this returns. Aborting the task
    /// drops the ticket, which still delivers the decrement.
    pub fn spawn_load(
        &self,
        loader: Arc<dyn ImageLoader>,
        src: impl Into<String>,
    ) -> Option<JoinHandle<Settlement>> {
        let src = src.into();
        let ticket = self.set_source(&src)?;
        Some(tokio::spawn(async move {
            let result = loader.load(&src).await;
            ticket.complete(result)
        }))
    }

    #[must_use]
    pub fn status(&self) -> ImageStatus {
        self.slot.lock().status.clone()
    }

    #[must_use]
    pub fn view(&self) -> ImageView {
        let status = self.status();
        ImageView {
            src: status.src().map(str::to_string),
            show_placeholder: matches!(status, ImageStatus::Pending { .. }),
            opacity: if status.is_loaded() { 1.0 } else { 0.0 },
            error_label: status.is_failed().then_some(IMAGE_ERROR_LABEL),
        }
    }
}

/// The pending half of one image load.
///
/// Settling (or dropping) the ticket decrements the image counter exactly
/// once. The visual result is applied only while the ticket is the slot's
/// latest load.
#[must_use = "dropping a ticket settles the load without a result"]
#[derive(Debug)]
pub struct ImageLoadTicket {
    bus: LoadingBus,
    slot: Arc<Mutex<Slot>>,
    seq: u64,
    src: String,
    settled: bool,
}

impl ImageLoadTicket {
    #[must_use]
    pub fn src(&self) -> &str {
        &self.src
    }

    /// Whether no newer source has been set on the slot
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.slot.lock().seq == self.seq
    }

    pub fn succeed(self, image: LoadedImage) -> Settlement {
        self.complete(Ok(image))
    }

    pub fn fail(self, error: ImageError) -> Settlement {
        self.complete(Err(error))
    }

    pub fn complete(mut self, result: Result<LoadedImage, ImageError>) -> Settlement {
        self.settled = true;
        let settlement = {
            let mut slot = self.slot.lock();
            if slot.seq == self.seq {
                slot.status = match result {
                    Ok(image) => ImageStatus::Loaded {
                        src: self.src.clone(),
                        image: Arc::new(image),
                    },
                    Err(error) => {
                        log::debug!("image {} failed: {error}", self.src);
                        ImageStatus::Failed {
                            src: self.src.clone(),
                            reason: error.to_string(),
                        }
                    }
                };
                Settlement::Applied
            } else {
                log::trace!("ignoring stale image load #{} for {}", self.seq, self.src);
                Settlement::Stale
            }
        };
        // Decrement after releasing the slot so listeners can read it.
        self.bus.decrement_image();
        settlement
    }
}

impl Drop for ImageLoadTicket {
    fn drop(&mut self) {
        if !self.settled {
            self.settled = true;
            self.bus.decrement_image();
        }
    }
}
