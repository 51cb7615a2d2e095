//! In-memory TTL cache for provider responses.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use super::{ApiRequest, TransportResponse};

#[derive(Debug, Clone)]
struct CachedResponse {
    status: u16,
    body: String,
    expires_at: DateTime<Utc>,
}

/// Response cache keyed by request identity.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: RwLock<HashMap<String, CachedResponse>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache key for a request: sha256 over method, URL and encoded body.
    ///
    /// Headers are not part of the key, so a refreshed token still hits.
    pub fn key(request: &ApiRequest) -> String {
        let mut hasher = Sha256::new();
        hasher.update(request.method.as_str().as_bytes());
        hasher.update(b"\n");
        hasher.update(request.url.as_bytes());
        hasher.update(b"\n");
        if let Some(body) = &request.body {
            hasher.update(body.encode().as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }

    /// Fetch a live entry. Expired entries are dropped.
    pub async fn get(&self, key: &str) -> Option<TransportResponse> {
        let now = Utc::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > now => {
                    return Some(TransportResponse {
                        status: entry.status,
                        body: entry.body.clone(),
                        from_cache: true,
                    });
                }
                Some(_) => {}
                None => return None,
            }
        }

        self.entries.write().await.remove(key);
        None
    }

    /// Store a response for `ttl`, pruning entries that have already expired.
    pub async fn put(&self, key: String, response: &TransportResponse, ttl: Duration) {
        let now = Utc::now();
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::zero());
        let entry = CachedResponse {
            status: response.status,
            body: response.body.clone(),
            expires_at: now + ttl,
        };

        let mut entries = self.entries.write().await;
        entries.retain(|_, cached| cached.expires_at > now);
        entries.insert(key, entry);
    }

    /// Number of stored entries, live or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}
