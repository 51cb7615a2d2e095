//! Provider API client with one-shot credential recovery.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

use crate::metrics;

use super::{
    add_params_to_url, ApiError, ApiRequest, AuthContext, HttpTransport, RequestOptions,
    TransportResponse,
};

/// Request executor bound to one provider.
pub struct ApiClient {
    /// Service name for logging/metrics.
    service: String,
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    auth: Arc<AuthContext>,
    defaults: RequestOptions,
}

impl ApiClient {
    /// Create a client for `base_url`.
    pub fn new(
        service: impl Into<String>,
        base_url: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
        auth: Arc<AuthContext>,
    ) -> Self {
        Self {
            service: service.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            transport,
            auth,
            defaults: RequestOptions::default(),
        }
    }

    /// Set the options every call starts from.
    pub fn with_defaults(mut self, defaults: RequestOptions) -> Self {
        self.defaults = defaults;
        self
    }

    /// Default options for a call.
    pub fn options(&self) -> RequestOptions {
        self.defaults.clone()
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn auth(&self) -> &Arc<AuthContext> {
        &self.auth
    }

    /// Absolute URL for an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Execute a request.
    ///
    /// A 401 with a registered refresher triggers exactly one refresh. On
    /// success the request is replayed with regenerated headers and the
    /// response cache bypassed; otherwise the original error is returned.
    pub async fn execute(
        &self,
        mut request: ApiRequest,
        options: RequestOptions,
    ) -> Result<TransportResponse, ApiError> {
        let err = match self.send(&mut request, &options).await {
            Ok(response) => return Ok(response),
            Err(err) => err,
        };

        if !err.is_unauthorized() || !self.auth.can_refresh() {
            return Err(self.handle_error(err));
        }

        info!(service = %self.service, "Refreshing credentials");
        if self.auth.refresh().await.is_err() {
            return Err(self.handle_error(err));
        }

        request.headers = None;
        let replay = options.with_bypass_cache(true);
        self.send(&mut request, &replay)
            .await
            .map_err(|e| self.handle_error(e))
    }

    /// Execute a request and decode its JSON body.
    pub async fn execute_json<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let response = self.execute(request, options).await?;
        serde_json::from_str(&response.body)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }

    /// GET `path` with optional query parameters.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, Option<String>)],
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let url = add_params_to_url(&self.url(path), params);
        self.execute_json(ApiRequest::get(url), options).await
    }

    /// POST form fields to `path` and decode the JSON reply.
    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Vec<(String, String)>,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let request = ApiRequest::post(self.url(path)).with_form(form);
        self.execute_json(request, options).await
    }

    /// POST form fields to `path`, ignoring the body.
    pub async fn post_empty(
        &self,
        path: &str,
        form: Vec<(String, String)>,
        options: RequestOptions,
    ) -> Result<(), ApiError> {
        let request = ApiRequest::post(self.url(path)).with_form(form);
        self.execute(request, options).await.map(|_| ())
    }

    async fn send(
        &self,
        request: &mut ApiRequest,
        options: &RequestOptions,
    ) -> Result<TransportResponse, ApiError> {
        if request.headers.is_none() {
            request.headers = Some(self.auth.headers().await);
        }

        debug!(
            service = %self.service,
            method = request.method.as_str(),
            url = %request.url,
            "Sending request"
        );

        let response = match self.transport.send(request, options).await {
            Ok(response) => response,
            Err(e) => {
                metrics::API_REQUESTS
                    .with_label_values(&[self.service.as_str(), "transport_error"])
                    .inc();
                return Err(e);
            }
        };

        if response.from_cache {
            metrics::RESPONSE_CACHE_HITS
                .with_label_values(&[self.service.as_str()])
                .inc();
        }

        let status = response.status.to_string();
        metrics::API_REQUESTS
            .with_label_values(&[self.service.as_str(), status.as_str()])
            .inc();

        if response.is_success() {
            Ok(response)
        } else {
            Err(ApiError::status(response.status, &response.body))
        }
    }

    fn handle_error(&self, err: ApiError) -> ApiError {
        if err.is_escalated() {
            error!(service = %self.service, error = %err, "Unhandled API error");
            metrics::API_UNHANDLED_ERRORS
                .with_label_values(&[self.service.as_str()])
                .inc();
        } else {
            debug!(service = %self.service, error = %err, "API error left to caller");
        }
        err
    }
}
