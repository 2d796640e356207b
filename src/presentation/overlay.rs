//! Blocking overlay shown while anything is loading

use parking_lot::Mutex;
use std::sync::Arc;

use crate::loading_bus::{LoadingBus, LoadingState, Subscription};

/// Heading shown on the overlay card
pub const OVERLAY_HEADING: &str = "Loading…";

/// Human-readable pending count, e.g. `"1 loading…"` or `"3 loadings…"`
#[must_use]
pub fn overlay_label(total: usize) -> String {
    let plural = if total == 1 { "" } else { "s" };
    format!("{total} loading{plural}…")
}

/// Render model for the overlay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayView {
    pub visible: bool,
    pub heading: &'static str,
    pub label: String,
}

impl From<LoadingState> for OverlayView {
    fn from(state: LoadingState) -> Self {
        Self {
            visible: state.is_loading(),
            heading: OVERLAY_HEADING,
            label: overlay_label(state.total_pending()),
        }
    }
}

/// Mirrors the latest bus snapshot; visible iff something is loading
#[derive(Debug)]
pub struct LoadingOverlay {
    latest: Arc<Mutex<LoadingState>>,
    subscription: Subscription,
}

impl LoadingOverlay {
    #[must_use]
    pub fn mount(bus: &LoadingBus) -> Self {
        let latest = Arc::new(Mutex::new(LoadingState::idle()));
        let sink = Arc::clone(&latest);
        let subscription = bus.subscribe(move |state| *sink.lock() = state);
        {
            // Hold the slot while reading so a concurrent notification lands after us.
            let mut slot = latest.lock();
            *slot = bus.state();
        }
        Self {
            latest,
            subscription,
        }
    }

    #[must_use]
    pub fn state(&self) -> LoadingState {
        *self.latest.lock()
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.state().is_loading()
    }

    #[must_use]
    pub fn view(&self) -> OverlayView {
        self.state().into()
    }

    pub fn unmount(self) {
        self.subscription.unsubscribe();
    }
}
