//! `TrackedClient`: a reqwest client with installable request interceptors

use parking_lot::RwLock;
use reqwest::header::{AUTHORIZATION, CACHE_CONTROL};
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use url::Url;

use super::errors::{ApiError, ApiResult};
use super::interceptor::{InFlight, LoadingInterceptor, Outcome, RequestContext, RequestInterceptor};
use super::options::RequestOptions;
use crate::loading_bus::LoadingBus;

/// Default timeout applied when a request does not set its own
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client whose requests pass through installed interceptors.
///
/// Clones share the underlying connection pool and interceptor list, so an
/// interceptor installed once is seen by every clone.
#[derive(Clone)]
pub struct TrackedClient {
    http: Client,
    base_url: Url,
    default_timeout: Duration,
    interceptors: Arc<RwLock<Vec<Arc<dyn RequestInterceptor>>>>,
    next_request_id: Arc<AtomicU64>,
}

impl TrackedClient {
    /// Create a client rooted at `base_url`.
    ///
    /// Relative request paths are joined onto the base; a trailing slash is
    /// added to the base so `https://api.example.com/v1` keeps its `/v1`.
    pub fn new(base_url: &str) -> ApiResult<Self> {
        Self::with_http_client(base_url, Client::new(), DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_http_client(
        base_url: &str,
        http: Client,
        default_timeout: Duration,
    ) -> ApiResult<Self> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized).map_err(|source| ApiError::InvalidUrl {
            path: base_url.to_string(),
            source,
        })?;
        Ok(Self {
            http,
            base_url,
            default_timeout,
            interceptors: Arc::new(RwLock::new(Vec::new())),
            next_request_id: Arc::new(AtomicU64::new(1)),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Install an interceptor.
    ///
    /// Returns `false` and leaves the client unchanged when an interceptor
    /// with the same id is already installed.
    pub fn install<I>(&self, interceptor: I) -> bool
    where
        I: RequestInterceptor + 'static,
    {
        let mut interceptors = self.interceptors.write();
        if interceptors.iter().any(|i| i.id() == interceptor.id()) {
            log::debug!("interceptor '{}' already installed", interceptor.id());
            return false;
        }
        log::debug!("installing interceptor '{}'", interceptor.id());
        interceptors.push(Arc::new(interceptor));
        true
    }

    /// Count this client's requests on `bus`. Idempotent.
    pub fn install_loading_instrumentation(&self, bus: &LoadingBus) -> bool {
        self.install(LoadingInterceptor::new(bus.clone()))
    }

    #[must_use]
    pub fn interceptor_count(&self) -> usize {
        self.interceptors.read().len()
    }

    pub fn request(&self, method: Method, path: impl Into<String>) -> TrackedRequest<'_> {
        TrackedRequest {
            client: self,
            method,
            path: path.into(),
            options: RequestOptions::default(),
            body: Body::Empty,
        }
    }

    pub fn get(&self, path: impl Into<String>) -> TrackedRequest<'_> {
        self.request(Method::GET, path)
    }

    pub fn post(&self, path: impl Into<String>) -> TrackedRequest<'_> {
        self.request(Method::POST, path)
    }

    pub fn patch(&self, path: impl Into<String>) -> TrackedRequest<'_> {
        self.request(Method::PATCH, path)
    }

    pub fn delete(&self, path: impl Into<String>) -> TrackedRequest<'_> {
        self.request(Method::DELETE, path)
    }

    fn resolve(&self, path: &str) -> ApiResult<Url> {
        let relative = path.trim_start_matches('/');
        self.base_url
            .join(relative)
            .map_err(|source| ApiError::InvalidUrl {
                path: path.to_string(),
                source,
            })
    }

    fn interceptor_chain(&self) -> Arc<[Arc<dyn RequestInterceptor>]> {
        Arc::from(self.interceptors.read().clone())
    }
}

impl std::fmt::Debug for TrackedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackedClient")
            .field("base_url", &self.base_url.as_str())
            .field("default_timeout", &self.default_timeout)
            .field("interceptors", &self.interceptor_count())
            .finish()
    }
}

enum Body {
    Empty,
    Json(Result<serde_json::Value, serde_json::Error>),
    Multipart(reqwest::multipart::Form),
}

/// Body after encoding succeeded
enum Payload {
    Empty,
    Json(serde_json::Value),
    Multipart(reqwest::multipart::Form),
}

/// A request being assembled on a [`TrackedClient`]
#[must_use = "requests do nothing until sent"]
pub struct TrackedRequest<'a> {
    client: &'a TrackedClient,
    method: Method,
    path: String,
    options: RequestOptions,
    body: Body,
}

impl TrackedRequest<'_> {
    /// Merge `options` into what the builder already set.
    ///
    /// See [`RequestOptions::merge`]: an earlier opt-out or query survives.
    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options.merge(options);
        self
    }

    /// Keep this request out of the global loading indicator
    pub fn skip_global_loading(mut self) -> Self {
        self.options.skip_global_loading = true;
        self
    }

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.options.bearer = Some(token.into());
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.query.push((key.into(), value.into()));
        self
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Self {
        self.body = Body::Json(serde_json::to_value(body));
        self
    }

    pub fn multipart(mut self, form: reqwest::multipart::Form) -> Self {
        self.body = Body::Multipart(form);
        self
    }

    /// Send the request and read the whole body.
    ///
    /// Interceptors settle after the body has been read (or failed to read),
    /// before any status error is returned.
    pub async fn send(self) -> ApiResult<ApiResponse> {
        let client = self.client;
        let url = client.resolve(&self.path)?;
        let body = match self.body {
            Body::Empty => Payload::Empty,
            Body::Json(Ok(value)) => Payload::Json(value),
            Body::Json(Err(e)) => return Err(ApiError::Encode(e)),
            Body::Multipart(form) => Payload::Multipart(form),
        };

        let ctx = RequestContext {
            request_id: client.next_request_id.fetch_add(1, Ordering::Relaxed),
            method: self.method,
            url,
            options: self.options,
        };
        log::debug!(
            "#{} {} {} (tracked: {})",
            ctx.request_id,
            ctx.method,
            ctx.url,
            ctx.options.is_tracked()
        );

        let label = format!("#{} {} {}", ctx.request_id, ctx.method, ctx.url.path());
        let guard = InFlight::begin(ctx, client.interceptor_chain());
        let builder = client.build(guard.context(), body);

        let result = async {
            let response = builder.send().await?;
            let status = response.status();
            let bytes = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, bytes.to_vec()))
        }
        .await;

        match result {
            Ok((status, body)) => {
                guard.settle(Outcome::Response {
                    status: status.as_u16(),
                });
                let response = ApiResponse { status, body };
                if status.is_success() {
                    Ok(response)
                } else {
                    let message = response.server_message();
                    log::warn!("{label} -> {status}: {message}");
                    Err(ApiError::Status {
                        status: status.as_u16(),
                        message,
                    })
                }
            }
            Err(e) => {
                guard.settle(Outcome::TransportError {
                    message: e.to_string(),
                });
                log::warn!("{label} failed: {e}");
                Err(ApiError::Transport(e))
            }
        }
    }

    /// Send and decode a JSON response body
    pub async fn send_json<T: DeserializeOwned>(self) -> ApiResult<T> {
        self.send().await?.json()
    }
}

impl TrackedClient {
    fn build(&self, ctx: &RequestContext, body: Payload) -> reqwest::RequestBuilder {
        let mut builder = self
            .http
            .request(ctx.method.clone(), ctx.url.clone())
            .timeout(ctx.options.timeout.unwrap_or(self.default_timeout));
        if !ctx.options.query.is_empty() {
            builder = builder.query(&ctx.options.query);
        }
        if let Some(token) = &ctx.options.bearer {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if ctx.options.no_cache {
            builder = builder.header(CACHE_CONTROL, "no-cache");
        }
        match body {
            Payload::Empty => builder,
            Payload::Json(value) => builder.json(&value),
            Payload::Multipart(form) => builder.multipart(form),
        }
    }
}

/// A fully read response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn json<T: DeserializeOwned>(&self) -> ApiResult<T> {
        serde_json::from_slice(&self.body).map_err(ApiError::Decode)
    }

    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// The `message` field of a JSON body, falling back to the status reason
    #[must_use]
    pub fn server_message(&self) -> String {
        serde_json::from_slice::<serde_json::Value>(&self.body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
            .unwrap_or_else(|| {
                self.status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            })
    }
}
