//! Types for API requests and transports.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(40_000);

/// Errors that can occur while talking to a provider API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Not ready: {0}")]
    NotReady(String),

    #[error("Service not configured: {0}")]
    NotConfigured(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Build a status error, truncating the body.
    pub fn status(status: u16, body: &str) -> Self {
        ApiError::Status {
            status,
            body: body.chars().take(200).collect(),
        }
    }

    /// HTTP status code, if this is a status error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the provider rejected the credentials.
    pub fn is_unauthorized(&self) -> bool {
        self.status_code() == Some(401)
    }

    /// Whether this error goes to the unhandled-error path.
    ///
    /// 403 and 404 are left entirely to the caller.
    pub fn is_escalated(&self) -> bool {
        !matches!(self.status_code(), Some(403) | Some(404))
    }
}

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// Request body.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// `application/x-www-form-urlencoded` pairs.
    Form(Vec<(String, String)>),
    /// JSON document.
    Json(serde_json::Value),
}

impl RequestBody {
    /// Encode the body for the wire.
    pub fn encode(&self) -> String {
        match self {
            RequestBody::Form(pairs) => pairs
                .iter()
                .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                .collect::<Vec<_>>()
                .join("&"),
            RequestBody::Json(value) => value.to_string(),
        }
    }
}

/// A single provider request.
///
/// `headers: None` means "build them at send time"; the client fills them in
/// from the current credentials.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Option<Vec<(String, String)>>,
    pub body: Option<RequestBody>,
}

impl ApiRequest {
    /// Create a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: None,
            body: None,
        }
    }

    /// Create a POST request.
    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            headers: None,
            body: None,
        }
    }

    /// Attach form fields.
    pub fn with_form<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.body = Some(RequestBody::Form(
            pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        ));
        self
    }

    /// Attach a JSON body.
    pub fn with_json(mut self, value: serde_json::Value) -> Self {
        self.body = Some(RequestBody::Json(value));
        self
    }

    /// Use explicit headers instead of generated ones.
    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Look up a header value (case-insensitive name).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .as_ref()?
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Append query parameters to a URL, skipping absent values.
pub fn add_params_to_url(url: &str, params: &[(&str, Option<String>)]) -> String {
    let query: Vec<String> = params
        .iter()
        .filter_map(|(k, v)| {
            v.as_ref()
                .map(|v| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        })
        .collect();

    if query.is_empty() {
        return url.to_string();
    }

    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", url, separator, query.join("&"))
}

/// Per-call knobs forwarded to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    /// Cache successful responses for this long.
    pub cache_time: Option<Duration>,
    /// Per-call timeout (default: 40s).
    pub timeout: Duration,
    /// Skip the response cache lookup.
    pub bypass_cache: bool,
    /// Send through the transport's single request queue.
    pub queue_enabled: bool,
    /// Wait this long before retrying a 429.
    pub rate_limit_wait: Option<Duration>,
    /// Minimum spacing between consecutive requests.
    pub inter_request_wait: Option<Duration>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            cache_time: None,
            timeout: DEFAULT_TIMEOUT,
            bypass_cache: false,
            queue_enabled: false,
            rate_limit_wait: None,
            inter_request_wait: None,
        }
    }
}

impl RequestOptions {
    pub fn with_cache_time(mut self, cache_time: Option<Duration>) -> Self {
        self.cache_time = cache_time;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_bypass_cache(mut self, bypass: bool) -> Self {
        self.bypass_cache = bypass;
        self
    }
}

/// Raw response from a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
    /// Served from the response cache.
    pub from_cache: bool,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            from_cache: false,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes requests on the wire.
///
/// Any HTTP status is returned as `Ok`; `Err` is reserved for requests that
/// never produced a response.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(
        &self,
        request: &ApiRequest,
        options: &RequestOptions,
    ) -> Result<TransportResponse, ApiError>;
}
