use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Counters describing how the loading bus has been used.
///
/// All counters use `Ordering::SeqCst` so a snapshot taken between mutations
/// is coherent across fields.
#[derive(Debug, Default)]
pub struct BusMetrics {
    increments: AtomicU64,
    decrements: AtomicU64,
    clamped_decrements: AtomicU64,
    notifications: AtomicU64,
    listener_panics: AtomicU64,
    peak_pending: AtomicUsize,
}

impl BusMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_increment(&self, total_pending: usize) {
        self.increments.fetch_add(1, Ordering::SeqCst);
        let _ = self.peak_pending.fetch_max(total_pending, Ordering::SeqCst);
    }

    pub(crate) fn record_decrement(&self) {
        self.decrements.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_clamped_decrement(&self) {
        self.clamped_decrements.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_notifications(&self, delivered: usize) {
        self.notifications.fetch_add(delivered as u64, Ordering::SeqCst);
    }

    pub(crate) fn record_listener_panic(&self) {
        self.listener_panics.fetch_add(1, Ordering::SeqCst);
    }

    #[must_use]
    pub fn snapshot(&self) -> BusMetricsSnapshot {
        BusMetricsSnapshot {
            increments: self.increments.load(Ordering::SeqCst),
            decrements: self.decrements.load(Ordering::SeqCst),
            clamped_decrements: self.clamped_decrements.load(Ordering::SeqCst),
            notifications: self.notifications.load(Ordering::SeqCst),
            listener_panics: self.listener_panics.load(Ordering::SeqCst),
            peak_pending: self.peak_pending.load(Ordering::SeqCst),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusMetricsSnapshot {
    pub increments: u64,
    /// Decrements that actually lowered a counter
    pub decrements: u64,
    /// Decrements that arrived while the counter was already zero
    pub clamped_decrements: u64,
    pub notifications: u64,
    pub listener_panics: u64,
    pub peak_pending: usize,
}

impl BusMetricsSnapshot {
    /// Operations started but not yet matched by a decrement
    #[must_use]
    pub fn outstanding(&self) -> u64 {
        self.increments.saturating_sub(self.decrements)
    }

    /// True when some completion was signalled more than once
    #[must_use]
    pub fn saw_duplicate_completion(&self) -> bool {
        self.clamped_decrements > 0
    }
}
