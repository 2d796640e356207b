//! Debounced delivery for search boxes
//!
//! Each `push` replaces the pending value and restarts the quiet period;
//! the callback fires once input has been idle for the full delay, or
//! immediately on `flush` (explicit submit).

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::{Handle, TryCurrentError};
use tokio::task::JoinHandle;

struct Pending<T> {
    value: Option<T>,
    timer: Option<JoinHandle<()>>,
    generation: u64,
}

pub struct Debouncer<T: Send + 'static> {
    delay: Duration,
    state: Arc<Mutex<Pending<T>>>,
    deliver: Arc<dyn Fn(T) + Send + Sync>,
    runtime: Handle,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F>(delay: Duration, deliver: F) -> Result<Self, TryCurrentError>
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Ok(Self::with_handle(delay, deliver, Handle::try_current()?))
    }

    pub fn with_handle<F>(delay: Duration, deliver: F, runtime: Handle) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            delay,
            state: Arc::new(Mutex::new(Pending {
                value: None,
                timer: None,
                generation: 0,
            })),
            deliver: Arc::new(deliver),
            runtime,
        }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace the pending value and restart the quiet period
    pub fn push(&self, value: T) {
        let mut state = self.state.lock();
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        state.value = Some(value);
        state.generation += 1;

        let generation = state.generation;
        let delay = self.delay;
        let shared = Arc::downgrade(&self.state);
        let deliver = Arc::clone(&self.deliver);
        state.timer = Some(self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(shared) = shared.upgrade() else { return };
            let value = {
                let mut state = shared.lock();
                if state.generation != generation {
                    return;
                }
                state.timer = None;
                state.value.take()
            };
            if let Some(value) = value {
                deliver(value);
            }
        }));
    }

    /// Deliver the pending value now. Returns `false` if nothing was pending.
    pub fn flush(&self) -> bool {
        let value = {
            let mut state = self.state.lock();
            if let Some(timer) = state.timer.take() {
                timer.abort();
            }
            state.generation += 1;
            state.value.take()
        };
        match value {
            Some(value) => {
                (self.deliver)(value);
                true
            }
            None => false,
        }
    }

    /// Drop the pending value without delivering it
    pub fn cancel(&self) {
        let mut state = self.state.lock();
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        state.generation += 1;
        state.value = None;
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state.lock().value.is_some()
    }
}

impl<T: Send + 'static> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(timer) = self.state.lock().timer.take() {
            timer.abort();
        }
    }
}

impl<T: Send + 'static> std::fmt::Debug for Debouncer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("delay", &self.delay)
            .field("pending", &self.is_pending())
            .finish()
    }
}
