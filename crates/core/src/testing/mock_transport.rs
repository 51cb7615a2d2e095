//! Mock HTTP transport for testing.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::api::{ApiError, ApiRequest, HttpTransport, RequestOptions, TransportResponse};

/// A request seen by the transport, for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// The request as sent, with headers filled in.
    pub request: ApiRequest,
    /// The options it was sent with.
    pub options: RequestOptions,
    /// When the request was made.
    pub timestamp: chrono::DateTime<Utc>,
}

/// Mock implementation of the HttpTransport trait.
///
/// Replies with scripted responses in order and records every request.
/// When the script runs out, requests fail with a connection error.
///
/// # Example
///
/// ```rust,ignore
/// let transport = Arc::new(MockTransport::new());
/// transport.push_response(401, "bad_token").await;
/// transport.push_response(200, "{}").await;
///
/// // ... run the client ...
///
/// let recorded = transport.recorded().await;
/// assert!(recorded[1].options.bypass_cache);
/// ```
#[derive(Debug, Default)]
pub struct MockTransport {
    /// Scripted replies, consumed front to back.
    script: Arc<RwLock<VecDeque<Result<TransportResponse, ApiError>>>>,
    /// Recorded requests.
    requests: Arc<RwLock<Vec<RecordedRequest>>>,
}

impl MockTransport {
    /// Create a transport with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with the given status and body.
    pub async fn push_response(&self, status: u16, body: &str) {
        self.script
            .write()
            .await
            .push_back(Ok(TransportResponse::new(status, body)));
    }

    /// Queue a transport-level failure.
    pub async fn push_error(&self, error: ApiError) {
        self.script.write().await.push_back(Err(error));
    }

    /// Get all recorded requests.
    pub async fn recorded(&self) -> Vec<RecordedRequest> {
        self.requests.read().await.clone()
    }

    /// Number of scripted replies not yet consumed.
    pub async fn remaining(&self) -> usize {
        self.script.read().await.len()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(
        &self,
        request: &ApiRequest,
        options: &RequestOptions,
    ) -> Result<TransportResponse, ApiError> {
        self.requests.write().await.push(RecordedRequest {
            request: request.clone(),
            options: options.clone(),
            timestamp: Utc::now(),
        });

        self.script.write().await.pop_front().unwrap_or_else(|| {
            Err(ApiError::ConnectionFailed(format!(
                "no scripted response for {} {}",
                request.method.as_str(),
                request.url
            )))
        })
    }
}
