//! Snapshot types published by the loading bus

use serde::{Deserialize, Serialize};

/// Which counter a tracked operation contributes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PendingKind {
    /// An outgoing HTTP request
    Network,
    /// An image load started by a tracked image slot
    Image,
}

/// Combined snapshot of both pending counts
///
/// `is_loading` is derived on construction, so a published snapshot can never
/// disagree with its own counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoadingState {
    network_pending: usize,
    image_pending: usize,
    is_loading: bool,
}

impl LoadingState {
    #[must_use]
    pub const fn new(network_pending: usize, image_pending: usize) -> Self {
        Self {
            network_pending,
            image_pending,
            is_loading: network_pending > 0 || image_pending > 0,
        }
    }

    /// Snapshot with nothing in flight
    #[must_use]
    pub const fn idle() -> Self {
        Self::new(0, 0)
    }

    #[must_use]
    pub const fn network_pending(&self) -> usize {
        self.network_pending
    }

    #[must_use]
    pub const fn image_pending(&self) -> usize {
        self.image_pending
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Pending count for a single kind
    #[must_use]
    pub const fn pending(&self, kind: PendingKind) -> usize {
        match kind {
            PendingKind::Network => self.network_pending,
            PendingKind::Image => self.image_pending,
        }
    }

    /// Network and image operations combined
    #[must_use]
    pub const fn total_pending(&self) -> usize {
        self.network_pending + self.image_pending
    }
}
