//! Mock debrid provider for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::api::ApiError;
use crate::provider::{AvailabilityRecord, DebridProvider, FileGroup, UnlockedLink};

/// A recorded unlock call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUnlock {
    /// Torrent URL that was unlocked.
    pub source_url: String,
    /// Requested file ids; empty means all files.
    pub file_ids: Vec<String>,
}

/// Mock implementation of the DebridProvider trait.
///
/// Provides controllable behavior for testing:
/// - Configure which hashes are cached, with their file groups
/// - Script unlock results in call order
/// - Track availability and unlock calls for assertions
///
/// # Example
///
/// ```rust,ignore
/// let provider = MockDebridProvider::new();
/// provider.set_cached("abc...", vec![fixtures::group(&[("1", "a.mkv", 10)])]).await;
/// provider.push_links(vec![fixtures::unlocked_link("a.mkv", 10)]).await;
///
/// // ... resolve and fetch ...
///
/// assert_eq!(provider.unlock_calls().await, vec![vec!["1".to_string()]]);
/// ```
#[derive(Debug)]
pub struct MockDebridProvider {
    configured: AtomicBool,
    /// Cached groups by hash.
    cached: Arc<RwLock<AvailabilityRecord>>,
    /// If set, availability lookups fail with this error.
    availability_error: Arc<RwLock<Option<ApiError>>>,
    /// Scripted unlock results, consumed front to back.
    unlocks: Arc<RwLock<VecDeque<Result<Vec<UnlockedLink>, ApiError>>>>,
    /// Recorded availability lookups.
    availability_calls: Arc<RwLock<Vec<Vec<String>>>>,
    /// Recorded unlock calls.
    unlock_calls: Arc<RwLock<Vec<RecordedUnlock>>>,
}

impl Default for MockDebridProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDebridProvider {
    /// Create a configured provider with nothing cached.
    pub fn new() -> Self {
        Self {
            configured: AtomicBool::new(true),
            cached: Arc::new(RwLock::new(AvailabilityRecord::new())),
            availability_error: Arc::new(RwLock::new(None)),
            unlocks: Arc::new(RwLock::new(VecDeque::new())),
            availability_calls: Arc::new(RwLock::new(Vec::new())),
            unlock_calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn set_configured(&self, configured: bool) {
        self.configured.store(configured, Ordering::SeqCst);
    }

    /// Mark a hash as cached with the given groups.
    pub async fn set_cached(&self, hash: &str, groups: Vec<FileGroup>) {
        self.cached.write().await.insert(hash, groups);
    }

    /// Make availability lookups fail.
    pub async fn fail_availability(&self, error: ApiError) {
        *self.availability_error.write().await = Some(error);
    }

    /// Queue links for the next unlock call.
    pub async fn push_links(&self, links: Vec<UnlockedLink>) {
        self.unlocks.write().await.push_back(Ok(links));
    }

    /// Queue a failure for the next unlock call.
    pub async fn push_unlock_error(&self, error: ApiError) {
        self.unlocks.write().await.push_back(Err(error));
    }

    /// Hash lists passed to availability lookups.
    pub async fn availability_calls(&self) -> Vec<Vec<String>> {
        self.availability_calls.read().await.clone()
    }

    /// File ids passed to each unlock call.
    pub async fn unlock_calls(&self) -> Vec<Vec<String>> {
        self.unlock_calls
            .read()
            .await
            .iter()
            .map(|call| call.file_ids.clone())
            .collect()
    }

    /// Full unlock calls, including the source URL.
    pub async fn recorded_unlocks(&self) -> Vec<RecordedUnlock> {
        self.unlock_calls.read().await.clone()
    }
}

#[async_trait]
impl DebridProvider for MockDebridProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn is_configured(&self) -> bool {
        self.configured.load(Ordering::SeqCst)
    }

    async fn instant_availability(
        &self,
        hashes: &[String],
    ) -> Result<AvailabilityRecord, ApiError> {
        self.availability_calls.write().await.push(hashes.to_vec());

        if let Some(error) = self.availability_error.read().await.clone() {
            return Err(error);
        }

        let cached = self.cached.read().await;
        let mut record = AvailabilityRecord::new();
        for hash in hashes {
            let groups = cached.groups(hash);
            if !groups.is_empty() {
                record.insert(hash, groups.to_vec());
            }
        }
        Ok(record)
    }

    async fn unlock(
        &self,
        source_url: &str,
        file_ids: &[String],
    ) -> Result<Vec<UnlockedLink>, ApiError> {
        self.unlock_calls.write().await.push(RecordedUnlock {
            source_url: source_url.to_string(),
            file_ids: file_ids.to_vec(),
        });

        self.unlocks
            .write()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::NotReady("no scripted links".to_string())))
    }
}
