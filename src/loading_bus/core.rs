//! Core struct, constructors and counter operations for the `LoadingBus`

use parking_lot::{Mutex, ReentrantMutex};
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::metrics::BusMetrics;
use super::subscription::Subscription;
use super::types::{LoadingState, PendingKind};

pub(crate) type Listener = Arc<dyn Fn(LoadingState) + Send + Sync>;

#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    network: usize,
    image: usize,
}

impl Counters {
    fn slot(&mut self, kind: PendingKind) -> &mut usize {
        match kind {
            PendingKind::Network => &mut self.network,
            PendingKind::Image => &mut self.image,
        }
    }

    fn state(self) -> LoadingState {
        LoadingState::new(self.network, self.image)
    }
}

pub(crate) struct BusInner {
    counters: Mutex<Counters>,
    pub(super) listeners: Mutex<Vec<(u64, Listener)>>,
    next_listener_id: AtomicU64,
    /// Serializes mutate-then-notify so every subscriber observes snapshots
    /// in mutation order. Re-entrant so a listener may touch the bus.
    dispatch: ReentrantMutex<()>,
    metrics: BusMetrics,
}

/// Process-wide counters for pending network and image operations.
///
/// The bus is an explicit object: construct one at application start and hand
/// clones to the HTTP client, image slots and presentation adapters. Clones
/// share the same counters and listeners.
///
/// Every mutation notifies all current subscribers synchronously, in
/// subscription order, with the full post-mutation [`LoadingState`].
#[derive(Clone)]
pub struct LoadingBus {
    pub(super) inner: Arc<BusInner>,
}

impl LoadingBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BusInner {
                counters: Mutex::new(Counters::default()),
                listeners: Mutex::new(Vec::new()),
                next_listener_id: AtomicU64::new(1),
                dispatch: ReentrantMutex::new(()),
                metrics: BusMetrics::new(),
            }),
        }
    }

    pub fn increment_network(&self) {
        self.increment(PendingKind::Network);
    }

    pub fn decrement_network(&self) {
        self.decrement(PendingKind::Network);
    }

    pub fn increment_image(&self) {
        self.increment(PendingKind::Image);
    }

    pub fn decrement_image(&self) {
        self.decrement(PendingKind::Image);
    }

    /// Add one pending operation of `kind` and notify subscribers
    pub fn increment(&self, kind: PendingKind) {
        let _dispatch = self.inner.dispatch.lock();
        let state = {
            let mut counters = self.inner.counters.lock();
            *counters.slot(kind) += 1;
            counters.state()
        };
        self.inner.metrics.record_increment(state.total_pending());
        log::trace!("loading bus: +{kind:?} -> {state:?}");
        self.notify(state);
    }

    /// Remove one pending operation of `kind` and notify subscribers
    ///
    /// A decrement at zero is clamped: the counter stays at zero, the event is
    /// recorded in the metrics and subscribers are still notified.
    pub fn decrement(&self, kind: PendingKind) {
        let _dispatch = self.inner.dispatch.lock();
        let (state, clamped) = {
            let mut counters = self.inner.counters.lock();
            let slot = counters.slot(kind);
            let clamped = *slot == 0;
            *slot = slot.saturating_sub(1);
            (counters.state(), clamped)
        };
        if clamped {
            self.inner.metrics.record_clamped_decrement();
            log::warn!("loading bus: {kind:?} decrement below zero clamped (duplicate completion?)");
        } else {
            self.inner.metrics.record_decrement();
        }
        log::trace!("loading bus: -{kind:?} -> {state:?}");
        self.notify(state);
    }

    /// Current snapshot, without side effects
    #[must_use]
    pub fn state(&self) -> LoadingState {
        self.inner.counters.lock().state()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state().is_loading()
    }

    /// Register `listener` for every subsequent change.
    ///
    /// The listener is not called with the current state; read [`state`]
    /// first when mounting after activity has already started.
    ///
    /// [`state`]: LoadingBus::state
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(LoadingState) + Send + Sync + 'static,
    {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.lock().push((id, Arc::new(listener)));
        log::debug!("loading bus: listener {id} subscribed");
        Subscription::new(Arc::downgrade(&self.inner), id)
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }

    #[must_use]
    pub fn metrics(&self) -> &BusMetrics {
        &self.inner.metrics
    }

    fn notify(&self, state: LoadingState) {
        // Snapshot the list so listeners can (un)subscribe while being called.
        let listeners: Vec<(u64, Listener)> = self.inner.listeners.lock().clone();
        let mut delivered = 0;
        for (id, listener) in listeners {
            match catch_unwind(AssertUnwindSafe(|| listener(state))) {
                Ok(()) => delivered += 1,
                Err(_) => {
                    self.inner.metrics.record_listener_panic();
                    log::error!("loading bus: listener {id} panicked while handling {state:?}");
                }
            }
        }
        self.inner.metrics.record_notifications(delivered);
    }
}

impl BusInner {
    pub(super) fn remove_listener(&self, id: u64) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        before != listeners.len()
    }
}

impl Default for LoadingBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LoadingBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadingBus")
            .field("state", &self.state())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(bus: &LoadingBus) -> (Arc<Mutex<Vec<LoadingState>>>, Subscription) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let sub = bus.subscribe(move |state| sink.lock().push(state));
        (seen, sub)
    }

    #[test]
    fn test_increment_and_decrement_notify_full_snapshot() {
        let bus = LoadingBus::new();
        let (seen, _sub) = recorder(&bus);

        bus.increment_network();
        bus.increment_image();
        bus.decrement_network();
        bus.decrement_image();

        assert_eq!(
            *seen.lock(),
            vec![
                LoadingState::new(1, 0),
                LoadingState::new(1, 1),
                LoadingState::new(0, 1),
                LoadingState::new(0, 0),
            ]
        );
        assert!(!bus.is_loading());
    }

    #[test]
    fn test_decrement_at_zero_is_clamped_but_still_notifies() {
        let bus = LoadingBus::new();
        let (seen, _sub) = recorder(&bus);

        bus.decrement_network();
        bus.decrement_image();

        assert_eq!(bus.state(), LoadingState::idle());
        assert_eq!(seen.lock().len(), 2);
        let metrics = bus.metrics().snapshot();
        assert_eq!(metrics.clamped_decrements, 2);
        assert_eq!(metrics.decrements, 0);
        assert!(metrics.saw_duplicate_completion());
    }

    #[test]
    fn test_listeners_run_in_subscription_order() {
        let bus = LoadingBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        let first = Arc::clone(&order);
        let second = Arc::clone(&order);
        let _a = bus.subscribe(move |_| first.lock().push("a"));
        let _b = bus.subscribe(move |_| second.lock().push("b"));

        bus.increment_network();

        assert_eq!(*order.lock(), vec!["a", "b"]);
    }

    #[test]
    fn test_state_has_no_side_effects() {
        let bus = LoadingBus::new();
        let (seen, _sub) = recorder(&bus);
        bus.increment_image();
        let _ = bus.state();
        let _ = bus.state();
        assert_eq!(seen.lock().len(), 1);
        assert_eq!(bus.state(), LoadingState::new(0, 1));
    }

    #[test]
    fn test_clones_share_counters() {
        let bus = LoadingBus::new();
        let other = bus.clone();
        other.increment_network();
        assert_eq!(bus.state().network_pending(), 1);
        bus.decrement_network();
        assert!(!other.is_loading());
    }

    #[test]
    fn test_panicking_listener_does_not_block_others() {
        let bus = LoadingBus::new();
        let _bad = bus.subscribe(|_| panic!("listener failure"));
        let (seen, _sub) = recorder(&bus);

        bus.increment_network();

        assert_eq!(seen.lock().len(), 1);
        assert_eq!(bus.metrics().snapshot().listener_panics, 1);
        assert_eq!(bus.state().network_pending(), 1);
    }

    #[test]
    fn test_listener_may_reenter_bus() {
        let bus = LoadingBus::new();
        let handle = bus.clone();
        let _sub = bus.subscribe(move |state| {
            // Settle image work as soon as it starts; bounded by the counter.
            if state.image_pending() > 0 {
                handle.decrement_image();
            }
        });

        bus.increment_image();

        assert_eq!(bus.state(), LoadingState::idle());
    }

    #[test]
    fn test_peak_pending_tracks_high_water_mark() {
        let bus = LoadingBus::new();
        bus.increment_network();
        bus.increment_network();
        bus.increment_image();
        bus.decrement_network();
        bus.decrement_network();
        bus.decrement_image();
        let metrics = bus.metrics().snapshot();
        assert_eq!(metrics.peak_pending, 3);
        assert_eq!(metrics.outstanding(), 0);
    }
}
