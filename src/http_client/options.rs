//! Per-request configuration carried from dispatch to settlement

use std::time::Duration;

/// Options attached to a single outgoing request.
///
/// The same value is visible to interceptors on dispatch and on settlement,
/// so a request that opts out of global loading is skipped symmetrically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Keep this request out of the global pending count
    pub skip_global_loading: bool,
    /// Bearer token for the `Authorization` header
    pub bearer: Option<String>,
    /// Overrides the client's default timeout
    pub timeout: Option<Duration>,
    /// Send `Cache-Control: no-cache`
    pub no_cache: bool,
    /// Extra query pairs, appended in order
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for silent background calls
    #[must_use]
    pub fn silent() -> Self {
        Self {
            skip_global_loading: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn skip_global_loading(mut self, skip: bool) -> Self {
        self.skip_global_loading = skip;
        self
    }

    #[must_use]
    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn no_cache(mut self) -> Self {
        self.no_cache = true;
        self
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Fold `other` into these options.
    ///
    /// Flags are OR-ed and query pairs appended, so an opt-out set earlier is
    /// never lost. `bearer` and `timeout` from `other` win when present.
    pub fn merge(&mut self, other: RequestOptions) {
        self.skip_global_loading |= other.skip_global_loading;
        self.no_cache |= other.no_cache;
        if other.bearer.is_some() {
            self.bearer = other.bearer;
        }
        if other.timeout.is_some() {
            self.timeout = other.timeout;
        }
        self.query.extend(other.query);
    }

    /// Whether the global loading bus should count this request
    #[must_use]
    pub fn is_tracked(&self) -> bool {
        !self.skip_global_loading
    }
}
