//! Request/response hooks and the in-flight settlement guard

use reqwest::Method;
use std::sync::Arc;
use url::Url;

use super::options::RequestOptions;
use crate::loading_bus::LoadingBus;

/// What a request looked like when it was dispatched
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Client-local sequence number, unique per `TrackedClient` family
    pub request_id: u64,
    pub method: Method,
    pub url: Url,
    pub options: RequestOptions,
}

/// How a request ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A response arrived and its body was read, whatever the status
    Response { status: u16 },
    /// The request never produced a complete response
    TransportError { message: String },
    /// The request future was dropped or unwound before settling
    Cancelled,
}

impl Outcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Response { status } if (200..300).contains(status))
    }
}

/// Hooks run around every request sent through a `TrackedClient`.
///
/// `on_request` runs before the request leaves the process; `on_settled` runs
/// exactly once afterwards with the same context. Implementations must not
/// panic: they observe requests, they do not take part in them.
pub trait RequestInterceptor: Send + Sync {
    /// Installation key; a client holds at most one interceptor per id
    fn id(&self) -> &'static str;

    fn on_request(&self, ctx: &RequestContext);

    fn on_settled(&self, ctx: &RequestContext, outcome: &Outcome);
}

/// Feeds request lifecycles into the loading bus's network counter
#[derive(Debug, Clone)]
pub struct LoadingInterceptor {
    bus: LoadingBus,
}

impl LoadingInterceptor {
    pub const ID: &'static str = "global-loading";

    #[must_use]
    pub fn new(bus: LoadingBus) -> Self {
        Self { bus }
    }
}

impl RequestInterceptor for LoadingInterceptor {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn on_request(&self, ctx: &RequestContext) {
        if ctx.options.is_tracked() {
            self.bus.increment_network();
        }
    }

    fn on_settled(&self, ctx: &RequestContext, _outcome: &Outcome) {
        if ctx.options.is_tracked() {
            self.bus.decrement_network();
        }
    }
}

/// Scoped acquisition for one request.
///
/// Creating the guard runs `on_request`; the guard settles exactly once,
/// either through [`InFlight::settle`] or from `Drop` with
/// [`Outcome::Cancelled`]. Only interceptors whose `on_request` completed are
/// settled.
pub(crate) struct InFlight {
    ctx: RequestContext,
    interceptors: Arc<[Arc<dyn RequestInterceptor>]>,
    started: usize,
    settled: bool,
}

impl InFlight {
    pub(crate) fn begin(
        ctx: RequestContext,
        interceptors: Arc<[Arc<dyn RequestInterceptor>]>,
    ) -> Self {
        let mut guard = Self {
            ctx,
            interceptors,
            started: 0,
            settled: false,
        };
        for interceptor in guard.interceptors.iter() {
            interceptor.on_request(&guard.ctx);
            guard.started += 1;
        }
        guard
    }

    pub(crate) fn context(&self) -> &RequestContext {
        &self.ctx
    }

    pub(crate) fn settle(mut self, outcome: Outcome) {
        self.finish(&outcome);
    }

    fn finish(&mut self, outcome: &Outcome) {
        if self.settled {
            return;
        }
        self.settled = true;
        // Unwind in reverse installation order.
        for interceptor in self.interceptors[..self.started].iter().rev() {
            interceptor.on_settled(&self.ctx, outcome);
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.settled {
            log::debug!(
                "{} {} dropped before settling",
                self.ctx.method,
                self.ctx.url
            );
            self.finish(&Outcome::Cancelled);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loading_bus::LoadingState;
    use parking_lot::Mutex;
    use proptest::prelude::*;

    #[derive(Default)]
    struct Journal {
        events: Mutex<Vec<String>>,
    }

    struct Recording {
        name: &'static str,
        journal: Arc<Journal>,
    }

    impl RequestInterceptor for Recording {
        fn id(&self) -> &'static str {
            self.name
        }

        fn on_request(&self, _ctx: &RequestContext) {
            self.journal.events.lock().push(format!("{}:request", self.name));
        }

        fn on_settled(&self, _ctx: &RequestContext, outcome: &Outcome) {
            self.journal
                .events
                .lock()
                .push(format!("{}:settled:{outcome:?}", self.name));
        }
    }

    fn ctx(options: RequestOptions) -> RequestContext {
        RequestContext {
            request_id: 1,
            method: Method::GET,
            url: Url::parse("http://localhost/homeData").expect("static URL should parse"),
            options,
        }
    }

    fn chain(journal: &Arc<Journal>) -> Arc<[Arc<dyn RequestInterceptor>]> {
        let a: Arc<dyn RequestInterceptor> = Arc::new(Recording {
            name: "a",
            journal: Arc::clone(journal),
        });
        let b: Arc<dyn RequestInterceptor> = Arc::new(Recording {
            name: "b",
            journal: Arc::clone(journal),
        });
        Arc::from(vec![a, b])
    }

    #[test]
    fn test_settle_runs_hooks_once_in_reverse_order() {
        let journal = Arc::new(Journal::default());
        let guard = InFlight::begin(ctx(RequestOptions::new()), chain(&journal));
        guard.settle(Outcome::Response { status: 200 });

        assert_eq!(
            *journal.events.lock(),
            vec![
                "a:request",
                "b:request",
                "b:settled:Response { status: 200 }",
                "a:settled:Response { status: 200 }",
            ]
        );
    }

    #[test]
    fn test_drop_settles_as_cancelled() {
        let journal = Arc::new(Journal::default());
        drop(InFlight::begin(ctx(RequestOptions::new()), chain(&journal)));

        let events = journal.events.lock();
        assert_eq!(events.len(), 4);
        assert_eq!(events[2], "b:settled:Cancelled");
    }

    #[test]
    fn test_loading_interceptor_balances_counter() {
        let bus = LoadingBus::new();
        let interceptors: Arc<[Arc<dyn RequestInterceptor>]> =
            Arc::from(vec![Arc::new(LoadingInterceptor::new(bus.clone())) as Arc<dyn RequestInterceptor>]);

        let guard = InFlight::begin(ctx(RequestOptions::new()), Arc::clone(&interceptors));
        assert_eq!(bus.state().network_pending(), 1);
        guard.settle(Outcome::TransportError {
            message: "connection reset".to_string(),
        });
        assert_eq!(bus.state().network_pending(), 0);

        let cancelled = InFlight::begin(ctx(RequestOptions::new()), interceptors);
        assert!(bus.is_loading());
        drop(cancelled);
        assert!(!bus.is_loading());
        assert_eq!(bus.metrics().snapshot().clamped_decrements, 0);
    }

    #[test]
    fn test_loading_interceptor_ignores_silent_requests() {
        let bus = LoadingBus::new();
        let interceptors: Arc<[Arc<dyn RequestInterceptor>]> =
            Arc::from(vec![Arc::new(LoadingInterceptor::new(bus.clone())) as Arc<dyn RequestInterceptor>]);
        let notifications = Arc::new(Mutex::new(0usize));
        let sink = Arc::clone(&notifications);
        let _sub = bus.subscribe(move |_| *sink.lock() += 1);

        let guard = InFlight::begin(ctx(RequestOptions::silent()), interceptors);
        assert_eq!(bus.state().network_pending(), 0);
        guard.settle(Outcome::Response { status: 500 });

        assert_eq!(bus.state().network_pending(), 0);
        assert_eq!(*notifications.lock(), 0);
    }

    fn loading_chain(bus: &LoadingBus) -> Arc<[Arc<dyn RequestInterceptor>]> {
        Arc::from(vec![
            Arc::new(LoadingInterceptor::new(bus.clone())) as Arc<dyn RequestInterceptor>
        ])
    }

    fn idle_transitions(states: &[LoadingState]) -> usize {
        let mut was_loading = false;
        let mut count = 0;
        for state in states {
            if was_loading && !state.is_loading() {
                count += 1;
            }
            was_loading = state.is_loading();
        }
        count
    }

    #[test]
    fn test_two_failures_and_one_success_go_idle_on_last_settle() {
        let bus = LoadingBus::new();
        let states = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&states);
        let _sub = bus.subscribe(move |state| sink.lock().push(state));
        let interceptors = loading_chain(&bus);

        let first = InFlight::begin(ctx(RequestOptions::new()), Arc::clone(&interceptors));
        let second = InFlight::begin(ctx(RequestOptions::new()), Arc::clone(&interceptors));
        let third = InFlight::begin(ctx(RequestOptions::new()), interceptors);
        assert_eq!(bus.state().network_pending(), 3);

        second.settle(Outcome::Response { status: 500 });
        assert!(bus.is_loading());
        first.settle(Outcome::TransportError {
            message: "connection reset".to_string(),
        });
        assert!(bus.is_loading());
        third.settle(Outcome::Response { status: 200 });
        assert!(!bus.is_loading());

        assert_eq!(idle_transitions(&states.lock()), 1);
    }

    fn outcome(i: usize) -> Outcome {
        match i % 3 {
            0 => Outcome::Response { status: 200 },
            1 => Outcome::Response { status: 500 },
            _ => Outcome::TransportError {
                message: "timed out".to_string(),
            },
        }
    }

    proptest! {
        #[test]
        fn settling_in_any_order_goes_idle_once_on_last(
            order in (1usize..12).prop_flat_map(|n| Just((0..n).collect::<Vec<_>>()).prop_shuffle())
        ) {
            let bus = LoadingBus::new();
            let states = Arc::new(Mutex::new(Vec::new()));
            let sink = Arc::clone(&states);
            let _sub = bus.subscribe(move |state| sink.lock().push(state));
            let interceptors = loading_chain(&bus);

            let mut guards: Vec<Option<InFlight>> = (0..order.len())
                .map(|_| Some(InFlight::begin(ctx(RequestOptions::new()), Arc::clone(&interceptors))))
                .collect();

            for (settled, &i) in order.iter().enumerate() {
                let guard = guards[i].take().expect("each guard settles once");
                // Some requests are abandoned instead of settled explicitly
                if i % 4 == 3 {
                    drop(guard);
                } else {
                    guard.settle(outcome(i));
                }
                let remaining = order.len() - settled - 1;
                prop_assert_eq!(bus.state().network_pending(), remaining);
                prop_assert_eq!(bus.is_loading(), remaining > 0);
            }

            prop_assert_eq!(idle_transitions(&states.lock()), 1);
            prop_assert_eq!(bus.metrics().snapshot().clamped_decrements, 0);
        }
    }
}
