//! Real-Debrid provider implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::api::{
    ApiClient, ApiError, ApiRequest, AuthContext, HttpTransport, ReqwestTransport, RequestOptions,
};
use crate::config::RealDebridConfig;

use super::{AvailabilityRecord, DebridProvider, UnlockedLink};

/// Key of Real-Debrid's own host in availability responses.
const HOST_KEY: &str = "rd";

#[derive(Debug, Deserialize)]
struct AddMagnetResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct TorrentInfoResponse {
    status: String,
    #[serde(default)]
    links: Vec<String>,
}

/// Real-Debrid client.
pub struct RealDebridProvider {
    api: ApiClient,
    config: RealDebridConfig,
}

impl RealDebridProvider {
    /// Create a provider with an explicit transport and auth context.
    pub fn new(
        config: RealDebridConfig,
        transport: Arc<dyn HttpTransport>,
        auth: Arc<AuthContext>,
    ) -> Self {
        let defaults = RequestOptions {
            timeout: Duration::from_secs(config.timeout_secs as u64),
            queue_enabled: config.queue_enabled,
            rate_limit_wait: config.rate_limit_wait_ms.map(Duration::from_millis),
            inter_request_wait: config.inter_request_wait_ms.map(Duration::from_millis),
            ..RequestOptions::default()
        };

        let api = ApiClient::new("real_debrid", config.api_url.clone(), transport, auth)
            .with_defaults(defaults);

        Self { api, config }
    }

    /// Create a provider using the reqwest transport and the configured token.
    pub fn from_config(config: RealDebridConfig) -> Self {
        let auth = Arc::new(AuthContext::new(Some(config.api_token.clone())));
        Self::new(config, Arc::new(ReqwestTransport::new()), auth)
    }

    /// The underlying API client.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Poll torrent info until its links are ready.
    async fn wait_for_links(&self, torrent_id: &str) -> Result<Vec<String>, ApiError> {
        let path = format!("/torrents/info/{}", torrent_id);
        let attempts = self.config.unlock_attempts.max(1);
        let mut last_status = String::new();

        for attempt in 1..=attempts {
            let info: TorrentInfoResponse =
                self.api.get(&path, &[], self.api.options()).await?;

            if info.status == "downloaded" && !info.links.is_empty() {
                return Ok(info.links);
            }

            debug!(
                torrent_id = torrent_id,
                status = %info.status,
                attempt = attempt,
                "Torrent links not ready"
            );
            last_status = info.status;

            if attempt < attempts {
                tokio::time::sleep(Duration::from_millis(self.config.unlock_retry_delay_ms)).await;
            }
        }

        Err(ApiError::NotReady(format!(
            "torrent {} is {}",
            torrent_id, last_status
        )))
    }
}

#[async_trait]
impl DebridProvider for RealDebridProvider {
    fn name(&self) -> &str {
        "real_debrid"
    }

    async fn is_configured(&self) -> bool {
        self.api.auth().has_token().await
    }

    async fn instant_availability(
        &self,
        hashes: &[String],
    ) -> Result<AvailabilityRecord, ApiError> {
        if hashes.is_empty() {
            return Ok(AvailabilityRecord::new());
        }

        let lowercase: Vec<String> = hashes.iter().map(|h| h.to_lowercase()).collect();
        let url = self.api.url(&format!(
            "/torrents/instantAvailability/{}",
            lowercase.join("/")
        ));

        let options = self.api.options().with_cache_time(
            self.config
                .availability_cache_secs
                .map(Duration::from_secs),
        );

        let body: serde_json::Value = self.api.execute_json(ApiRequest::get(url), options).await?;
        AvailabilityRecord::from_json(&body, HOST_KEY)
    }

    async fn unlock(
        &self,
        source_url: &str,
        file_ids: &[String],
    ) -> Result<Vec<UnlockedLink>, ApiError> {
        let added: AddMagnetResponse = self
            .api
            .post(
                "/torrents/addMagnet",
                vec![("magnet".to_string(), source_url.to_string())],
                self.api.options(),
            )
            .await?;

        let files = if file_ids.is_empty() {
            "all".to_string()
        } else {
            file_ids.join(",")
        };

        self.api
            .post_empty(
                &format!("/torrents/selectFiles/{}", added.id),
                vec![("files".to_string(), files)],
                self.api.options(),
            )
            .await?;

        let hoster_links = self.wait_for_links(&added.id).await?;

        let mut links = Vec::with_capacity(hoster_links.len());
        for hoster_link in hoster_links {
            let link: UnlockedLink = self
                .api
                .post(
                    "/unrestrict/link",
                    vec![("link".to_string(), hoster_link)],
                    self.api.options(),
                )
                .await?;
            links.push(link);
        }

        debug!(torrent_id = %added.id, links = links.len(), "Unlocked links");
        Ok(links)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{HttpMethod, RequestBody};
    use crate::testing::MockTransport;

    fn provider(transport: Arc<MockTransport>) -> RealDebridProvider {
        let mut config = RealDebridConfig::with_token("token");
        config.api_url = "https://rd.test/rest/1.0".to_string();
        config.unlock_retry_delay_ms = 0;
        config.availability_cache_secs = Some(60);
        let auth = Arc::new(AuthContext::new(Some("token".to_string())));
        RealDebridProvider::new(config, transport, auth)
    }

    #[tokio::test]
    async fn test_is_configured() {
        let p = provider(Arc::new(MockTransport::new()));
        assert!(p.is_configured().await);

        let unconfigured = RealDebridProvider::new(
            RealDebridConfig::with_token(""),
            Arc::new(MockTransport::new()),
            Arc::new(AuthContext::anonymous()),
        );
        assert!(!unconfigured.is_configured().await);
    }

    #[tokio::test]
    async fn test_instant_availability_single_call() {
        let transport = Arc::new(MockTransport::new());
        transport
            .push_response(
                200,
                r#"{"aaa": {"rd": [{"1": {"filename": "a.mkv", "filesize": 10}}]}, "bbb": []}"#,
            )
            .await;
        let p = provider(transport.clone());

        let record = p
            .instant_availability(&["AAA".to_string(), "bbb".to_string()])
            .await
            .unwrap();
        assert_eq!(record.groups("aaa").len(), 1);
        assert!(record.groups("bbb").is_empty());

        let recorded = transport.recorded().await;
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].request.method, HttpMethod::Get);
        assert_eq!(
            recorded[0].request.url,
            "https://rd.test/rest/1.0/torrents/instantAvailability/aaa/bbb"
        );
        assert_eq!(recorded[0].options.cache_time, Some(Duration::from_secs(60)));
        assert!(recorded[0].options.queue_enabled);
    }

    #[tokio::test]
    async fn test_instant_availability_empty_hashes() {
        let transport = Arc::new(MockTransport::new());
        let p = provider(transport.clone());
        let record = p.instant_availability(&[]).await.unwrap();
        assert!(record.is_empty());
        assert!(transport.recorded().await.is_empty());
    }

    #[tokio::test]
    async fn test_unlock_flow() {
        let transport = Arc::new(MockTransport::new());
        transport.push_response(201, r#"{"id": "T1", "uri": "x"}"#).await;
        transport.push_response(204, "").await;
        transport
            .push_response(200, r#"{"status": "downloaded", "links": ["https://rd/l1"]}"#)
            .await;
        transport
            .push_response(
                200,
                r#"{"id": "L1", "filename": "a.mkv", "filesize": 10, "download": "https://dl/a.mkv"}"#,
            )
            .await;
        let p = provider(transport.clone());

        let links = p
            .unlock("magnet:?xt=urn:btih:aaa", &["1".to_string(), "2".to_string()])
            .await
            .unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].download, "https://dl/a.mkv");

        let recorded = transport.recorded().await;
        assert_eq!(recorded.len(), 4);
        assert!(recorded[0].request.url.ends_with("/torrents/addMagnet"));
        assert!(recorded[1].request.url.ends_with("/torrents/selectFiles/T1"));
        assert_eq!(
            recorded[1].request.body,
            Some(RequestBody::Form(vec![("files".to_string(), "1,2".to_string())]))
        );
        assert!(recorded[2].request.url.ends_with("/torrents/info/T1"));
        assert!(recorded[3].request.url.ends_with("/unrestrict/link"));
    }

    #[tokio::test]
    async fn test_unlock_all_files() {
        let transport = Arc::new(MockTransport::new());
        transport.push_response(201, r#"{"id": "T1"}"#).await;
        transport.push_response(204, "").await;
        transport
            .push_response(200, r#"{"status": "downloaded", "links": []}"#)
            .await;
        transport
            .push_response(200, r#"{"status": "downloaded", "links": []}"#)
            .await;
        let p = provider(transport.clone());

        let result = p.unlock("magnet:?xt=urn:btih:aaa", &[]).await;
        assert!(matches!(result, Err(ApiError::NotReady(_))));

        let recorded = transport.recorded().await;
        assert_eq!(
            recorded[1].request.body,
            Some(RequestBody::Form(vec![("files".to_string(), "all".to_string())]))
        );
        // Two info polls with the default attempt count.
        assert_eq!(recorded.len(), 4);
    }

    #[tokio::test]
    async fn test_unlock_retries_info_until_ready() {
        let transport = Arc::new(MockTransport::new());
        transport.push_response(201, r#"{"id": "T1"}"#).await;
        transport.push_response(204, "").await;
        transport
            .push_response(200, r#"{"status": "queued", "links": []}"#)
            .await;
        transport
            .push_response(200, r#"{"status": "downloaded", "links": ["https://rd/l1"]}"#)
            .await;
        transport
            .push_response(200, r#"{"filename": "a.mkv", "download": "https://dl/a.mkv"}"#)
            .await;
        let p = provider(transport.clone());

        let links = p.unlock("magnet:?xt=urn:btih:aaa", &[]).await.unwrap();
        assert_eq!(links.len(), 1);
    }
}
