//! AllDebrid magnet status lookups.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::{
    ApiClient, ApiError, AuthContext, HttpTransport, ReqwestTransport, RequestOptions,
};
use crate::config::AllDebridConfig;

/// Magnet status filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MagnetStatusFilter {
    Active,
    Ready,
    Expired,
    Error,
}

impl MagnetStatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            MagnetStatusFilter::Active => "active",
            MagnetStatusFilter::Ready => "ready",
            MagnetStatusFilter::Expired => "expired",
            MagnetStatusFilter::Error => "error",
        }
    }
}

impl std::str::FromStr for MagnetStatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(MagnetStatusFilter::Active),
            "ready" => Ok(MagnetStatusFilter::Ready),
            "expired" => Ok(MagnetStatusFilter::Expired),
            "error" => Ok(MagnetStatusFilter::Error),
            other => Err(format!("unknown magnet status: {}", other)),
        }
    }
}

/// Error payload of an AllDebrid response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllDebridErrorDto {
    pub code: String,
    pub message: String,
}

/// `/magnet/status` response. `data` is passed through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MagnetStatusResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<AllDebridErrorDto>,
}

/// AllDebrid client.
pub struct AllDebridClient {
    api: ApiClient,
    agent: String,
}

impl AllDebridClient {
    pub fn new(
        config: AllDebridConfig,
        transport: Arc<dyn HttpTransport>,
        auth: Arc<AuthContext>,
    ) -> Self {
        let defaults = RequestOptions::default()
            .with_timeout(Duration::from_secs(config.timeout_secs as u64));
        let api = ApiClient::new("all_debrid", config.api_url.clone(), transport, auth)
            .with_defaults(defaults);

        Self {
            api,
            agent: config.agent,
        }
    }

    /// Create a client using the reqwest transport and the configured key.
    pub fn from_config(config: AllDebridConfig) -> Self {
        let auth = Arc::new(AuthContext::new(Some(config.api_key.clone())));
        Self::new(config, Arc::new(ReqwestTransport::new()), auth)
    }

    /// Status of one magnet (`id`) or of all magnets matching `status`.
    pub async fn magnet_status(
        &self,
        id: Option<&str>,
        status: Option<MagnetStatusFilter>,
    ) -> Result<MagnetStatusResponse, ApiError> {
        self.api
            .get(
                "/magnet/status",
                &[
                    ("agent", Some(self.agent.clone())),
                    ("id", id.map(str::to_string)),
                    ("status", status.map(|s| s.as_str().to_string())),
                ],
                self.api.options(),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;

    fn client(transport: Arc<MockTransport>) -> AllDebridClient {
        let config = AllDebridConfig {
            api_url: "https://ad.test/v4".to_string(),
            api_key: "key".to_string(),
            agent: "tester".to_string(),
            timeout_secs: 5,
        };
        AllDebridClient::new(config, transport, Arc::new(AuthContext::new(Some("key".into()))))
    }

    #[test]
    fn test_filter_parse() {
        assert_eq!("Ready".parse::<MagnetStatusFilter>(), Ok(MagnetStatusFilter::Ready));
        assert!("paused".parse::<MagnetStatusFilter>().is_err());
    }

    #[tokio::test]
    async fn test_magnet_status_query() {
        let transport = Arc::new(MockTransport::new());
        transport
            .push_response(200, r#"{"status": "success", "data": {"magnets": []}}"#)
            .await;
        let c = client(transport.clone());

        let response = c
            .magnet_status(None, Some(MagnetStatusFilter::Expired))
            .await
            .unwrap();
        assert_eq!(response.status, "success");
        assert!(response.data.is_some());

        let recorded = transport.recorded().await;
        assert_eq!(
            recorded[0].request.url,
            "https://ad.test/v4/magnet/status?agent=tester&status=expired"
        );
        assert_eq!(recorded[0].request.header("Authorization"), Some("Bearer key"));
        assert_eq!(recorded[0].options.timeout, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_magnet_status_by_id() {
        let transport = Arc::new(MockTransport::new());
        transport
            .push_response(
                200,
                r#"{"status": "error", "error": {"code": "MAGNET_INVALID_ID", "message": "bad id"}}"#,
            )
            .await;
        let c = client(transport.clone());

        let response = c.magnet_status(Some("42"), None).await.unwrap();
        assert_eq!(response.error.unwrap().code, "MAGNET_INVALID_ID");
        assert!(transport.recorded().await[0].request.url.contains("id=42"));
    }
}
