//! reqwest-backed transport with response caching and request throttling.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::{
    ApiError, ApiRequest, HttpMethod, HttpTransport, RequestBody, RequestOptions, ResponseCache,
    TransportResponse,
};

/// Maximum retries of a rate-limited (429) request.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Production transport.
///
/// - Successful responses are cached when `cache_time` is set
/// - `queue_enabled` requests are sent one at a time
/// - `inter_request_wait` spaces consecutive requests
/// - `rate_limit_wait` retries a 429 after sleeping
pub struct ReqwestTransport {
    client: Client,
    cache: ResponseCache,
    queue: Mutex<()>,
    last_request: Mutex<Option<Instant>>,
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    /// Use a preconfigured reqwest client.
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            cache: ResponseCache::new(),
            queue: Mutex::new(()),
            last_request: Mutex::new(None),
        }
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Sleep until `wait` has passed since the previous request.
    async fn space_requests(&self, wait: Option<Duration>) {
        let mut last = self.last_request.lock().await;
        if let (Some(wait), Some(previous)) = (wait, *last) {
            let ready_at = previous + wait;
            if ready_at > Instant::now() {
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        timeout: Duration,
    ) -> Result<TransportResponse, ApiError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
            HttpMethod::Delete => self.client.delete(&request.url),
        }
        .timeout(timeout);

        for (name, value) in request.headers.iter().flatten() {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = &request.body {
            if matches!(body, RequestBody::Json(_)) && request.header("Content-Type").is_none() {
                builder = builder.header("Content-Type", "application/json");
            }
            builder = builder.body(body.encode());
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout
            } else if e.is_connect() {
                ApiError::ConnectionFailed(e.to_string())
            } else {
                ApiError::Internal(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout
            } else {
                ApiError::InvalidResponse(e.to_string())
            }
        })?;

        Ok(TransportResponse::new(status, body))
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(
        &self,
        request: &ApiRequest,
        options: &RequestOptions,
    ) -> Result<TransportResponse, ApiError> {
        let cache_key = options.cache_time.map(|_| ResponseCache::key(request));

        if let Some(key) = &cache_key {
            if !options.bypass_cache {
                if let Some(hit) = self.cache.get(key).await {
                    debug!(url = %request.url, "Serving cached response");
                    return Ok(hit);
                }
            }
        }

        let _queued = if options.queue_enabled {
            Some(self.queue.lock().await)
        } else {
            None
        };

        let mut retries = 0;
        loop {
            self.space_requests(options.inter_request_wait).await;
            let response = self.dispatch(request, options.timeout).await?;

            if response.status == 429 {
                if let Some(wait) = options.rate_limit_wait {
                    if retries < MAX_RATE_LIMIT_RETRIES {
                        retries += 1;
                        warn!(
                            url = %request.url,
                            retry = retries,
                            wait_ms = wait.as_millis() as u64,
                            "Rate limited, waiting before retry"
                        );
                        tokio::time::sleep(wait).await;
                        continue;
                    }
                }
            }

            if let (Some(key), Some(ttl)) = (cache_key, options.cache_time) {
                if response.is_success() {
                    self.cache.put(key, &response, ttl).await;
                }
            }

            return Ok(response);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cached_response_served_without_network() {
        let transport = ReqwestTransport::new();
        // Unroutable URL: a network attempt would fail.
        let request = ApiRequest::get("http://127.0.0.1:9/cached");
        let key = ResponseCache::key(&request);
        transport
            .cache()
            .put(key, &TransportResponse::new(200, "{\"a\":1}"), Duration::from_secs(60))
            .await;

        let options = RequestOptions::default().with_cache_time(Some(Duration::from_secs(60)));
        let response = transport.send(&request, &options).await.unwrap();
        assert!(response.from_cache);
        assert_eq!(response.body, "{\"a\":1}");
    }

    #[tokio::test]
    async fn test_bypass_skips_cache_lookup() {
        let transport = ReqwestTransport::new();
        let request = ApiRequest::get("http://127.0.0.1:9/cached");
        let key = ResponseCache::key(&request);
        transport
            .cache()
            .put(key, &TransportResponse::new(200, "{}"), Duration::from_secs(60))
            .await;

        let options = RequestOptions::default()
            .with_cache_time(Some(Duration::from_secs(60)))
            .with_bypass_cache(true)
            .with_timeout(Duration::from_secs(2));
        let result = transport.send(&request, &options).await;
        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_space_requests_waits() {
        let transport = ReqwestTransport::new();
        let start = Instant::now();
        transport.space_requests(Some(Duration::from_millis(500))).await;
        transport.space_requests(Some(Duration::from_millis(500))).await;
        assert!(start.elapsed() >= Duration::from_millis(500));
    }
}
