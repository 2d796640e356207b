//! Shared helpers for the blogdesk integration tests

use blogdesk::{LoadingBus, LoadingState, Subscription, TrackedClient};
use mockito::{Mock, Server};
use parking_lot::Mutex;
use std::sync::Arc;

/// Sets up a mock HTTP server
#[allow(dead_code)]
pub async fn setup_mock_server() -> mockito::ServerGuard {
    Server::new_async().await
}

/// A client rooted at the mock server with loading instrumentation installed
#[allow(dead_code)]
pub fn tracked_client(server: &Server, bus: &LoadingBus) -> TrackedClient {
    let client = TrackedClient::new(&server.url()).expect("mock server URL should parse");
    assert!(client.install_loading_instrumentation(bus));
    client
}

/// Creates a mock endpoint that returns a JSON body
#[allow(dead_code)]
pub async fn create_json_mock(
    server: &mut Server,
    method: &str,
    path: &str,
    status: usize,
    body: &str,
) -> Mock {
    server
        .mock(method, path)
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

/// Records every state the bus publishes
#[allow(dead_code)]
pub struct StateRecorder {
    states: Arc<Mutex<Vec<LoadingState>>>,
    _subscription: Subscription,
}

#[allow(dead_code)]
impl StateRecorder {
    pub fn attach(bus: &LoadingBus) -> Self {
        let states = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&states);
        let subscription = bus.subscribe(move |state| sink.lock().push(state));
        Self {
            states,
            _subscription: subscription,
        }
    }

    pub fn states(&self) -> Vec<LoadingState> {
        self.states.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.states.lock().len()
    }

    /// Number of loading → idle transitions observed
    pub fn idle_transitions(&self) -> usize {
        let states = self.states.lock();
        let mut was_loading = false;
        let mut count = 0;
        for state in states.iter() {
            if was_loading && !state.is_loading() {
                count += 1;
            }
            was_loading = state.is_loading();
        }
        count
    }
}

/// Helper to create test URLs
#[allow(dead_code)]
pub fn test_url(server: &Server, path: &str) -> String {
    format!("{}{}", server.url(), path)
}
