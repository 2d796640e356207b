//! Subscription handles for the `LoadingBus`

use std::sync::Weak;

use super::core::BusInner;

/// Disposer returned by [`LoadingBus::subscribe`].
///
/// The handle does not keep the bus alive. Dropping it unsubscribes the
/// listener; call [`detach`] to keep the listener for the bus's lifetime.
///
/// [`LoadingBus::subscribe`]: super::LoadingBus::subscribe
/// [`detach`]: Subscription::detach
#[must_use = "dropping a Subscription immediately unsubscribes its listener"]
#[derive(Debug)]
pub struct Subscription {
    bus: Weak<BusInner>,
    id: u64,
    active: bool,
}

impl Subscription {
    pub(super) fn new(bus: Weak<BusInner>, id: u64) -> Self {
        Self {
            bus,
            id,
            active: true,
        }
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Stop receiving notifications
    pub fn unsubscribe(mut self) {
        self.release();
    }

    /// Keep the listener registered until the bus itself is dropped
    pub fn detach(mut self) {
        self.active = false;
    }

    fn release(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Some(inner) = self.bus.upgrade()
            && inner.remove_listener(self.id)
        {
            log::debug!("loading bus: listener {} unsubscribed", self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}
