//! Drives a [`ProgressBar`] from loading bus transitions
//!
//! On not-loading → loading the driver (re)starts the cycle and ticks the
//! animation on an interval; on loading → not-loading it jumps to 100% and
//! hides the bar after the configured delay. Only one cycle runs at a time:
//! every start aborts the pending tick and hide tasks first.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::runtime::{Handle, TryCurrentError};
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at, sleep};

use super::progress_bar::{ProgressBar, ProgressView};
use crate::config::ProgressBarConfig;
use crate::loading_bus::{LoadingBus, LoadingState, Subscription};

/// Receives every view the driver produces, in order.
///
/// Called with the driver's state locked: it must render, not touch the bus.
pub type ProgressSink = Arc<dyn Fn(ProgressView) + Send + Sync>;

struct DriverState {
    bar: ProgressBar,
    was_loading: bool,
    ticker: Option<JoinHandle<()>>,
    hider: Option<JoinHandle<()>>,
    sink: Option<ProgressSink>,
}

impl DriverState {
    fn emit(&self) {
        if let Some(sink) = &self.sink {
            sink(self.bar.view());
        }
    }

    fn cancel_timers(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
        if let Some(hider) = self.hider.take() {
            hider.abort();
        }
    }
}

type Shared = Arc<Mutex<DriverState>>;

/// Keeps a progress bar in step with a loading bus until dropped
pub struct ProgressDriver {
    state: Shared,
    subscription: Option<Subscription>,
}

impl ProgressDriver {
    /// Mount on the current tokio runtime
    pub fn mount(
        bus: &LoadingBus,
        config: ProgressBarConfig,
        sink: Option<ProgressSink>,
    ) -> Result<Self, TryCurrentError> {
        Ok(Self::mount_on(bus, config, sink, Handle::try_current()?))
    }

    /// Mount with timers spawned on `runtime`.
    ///
    /// If work is already pending the cycle starts immediately.
    pub fn mount_on(
        bus: &LoadingBus,
        config: ProgressBarConfig,
        sink: Option<ProgressSink>,
        runtime: Handle,
    ) -> Self {
        let state: Shared = Arc::new(Mutex::new(DriverState {
            bar: ProgressBar::new(config),
            was_loading: false,
            ticker: None,
            hider: None,
            sink,
        }));

        let listener_state = Arc::clone(&state);
        let listener_runtime = runtime.clone();
        let subscription = bus.subscribe(move |snapshot| {
            on_change(&listener_state, &listener_runtime, snapshot);
        });
        {
            // Read under the driver lock so a concurrent notification applies after us.
            let mut guard = state.lock();
            let current = bus.state();
            transition(&state, &mut guard, &runtime, current);
        }

        Self {
            state,
            subscription: Some(subscription),
        }
    }

    #[must_use]
    pub fn view(&self) -> ProgressView {
        self.state.lock().bar.view()
    }

    #[must_use]
    pub fn progress(&self) -> f64 {
        self.state.lock().bar.progress()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state.lock().bar.is_active()
    }

    /// Unsubscribe and stop all timers
    pub fn unmount(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        self.state.lock().cancel_timers();
    }
}

impl Drop for ProgressDriver {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for ProgressDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressDriver")
            .field("view", &self.view())
            .field("mounted", &self.subscription.is_some())
            .finish()
    }
}

fn on_change(state: &Shared, runtime: &Handle, snapshot: LoadingState) {
    let mut guard = state.lock();
    transition(state, &mut guard, runtime, snapshot);
}

fn transition(state: &Shared, guard: &mut DriverState, runtime: &Handle, snapshot: LoadingState) {
    let loading = snapshot.is_loading();
    if loading == guard.was_loading {
        return;
    }
    guard.was_loading = loading;
    if loading {
        start(state, guard, runtime);
    } else {
        finish(state, guard, runtime);
    }
}

fn start(state: &Shared, guard: &mut DriverState, runtime: &Handle) {
    guard.cancel_timers();
    guard.bar.start();
    guard.emit();

    let period = guard.bar.config().tick_interval;
    let weak = Arc::downgrade(state);
    guard.ticker = Some(runtime.spawn(async move {
        let mut ticks = interval_at(Instant::now() + period, period);
        loop {
            ticks.tick().await;
            let Some(state) = weak.upgrade() else { break };
            let mut guard = state.lock();
            if guard.bar.is_finishing() || !guard.bar.is_active() {
                break;
            }
            guard.bar.tick();
            guard.emit();
        }
    }));
}

fn finish(state: &Shared, guard: &mut DriverState, runtime: &Handle) {
    guard.cancel_timers();
    if !guard.bar.finish() {
        return;
    }
    guard.emit();

    let delay = guard.bar.config().hide_delay;
    let weak = Arc::downgrade(state);
    guard.hider = Some(runtime.spawn(async move {
        sleep(delay).await;
        if let Some(state) = weak.upgrade() {
            let mut guard = state.lock();
            guard.bar.hide();
            guard.hider = None;
            guard.emit();
        }
    }));
}
