//! Typed access to the blogging REST backend
//!
//! Every call goes through a [`TrackedClient`], so it shows up on the global
//! loading indicator unless the endpoint is one of the silent ones (login
//! and like toggling).

pub mod account;
pub mod blogs;
pub mod types;

use parking_lot::RwLock;
use std::sync::Arc;

use crate::http_client::{ApiError, ApiResult, RequestOptions, TrackedClient};

pub use types::*;

/// Credentials and identity returned by a successful login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub role: Role,
    pub username: String,
    pub user_id: String,
}

/// Client for the blogging API
///
/// Clones share the HTTP client and the session slot.
#[derive(Debug, Clone)]
pub struct BlogApi {
    client: TrackedClient,
    session: Arc<RwLock<Option<Session>>>,
}

impl BlogApi {
    #[must_use]
    pub fn new(client: TrackedClient) -> Self {
        Self {
            client,
            session: Arc::new(RwLock::new(None)),
        }
    }

    #[must_use]
    pub fn client(&self) -> &TrackedClient {
        &self.client
    }

    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.session.read().clone()
    }

    pub fn set_session(&self, session: Session) {
        *self.session.write() = Some(session);
    }

    /// Forget the stored session
    pub fn logout(&self) {
        if self.session.write().take().is_some() {
            log::debug!("session cleared");
        }
    }

    /// Options carrying the session's bearer token
    fn authed(&self) -> ApiResult<RequestOptions> {
        let session = self.session.read();
        let token = session.as_ref().map(|s| s.token.clone()).ok_or(ApiError::MissingToken)?;
        Ok(RequestOptions::new().bearer(token))
    }
}
