//! Types shared by debrid providers.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::ApiError;
use crate::matcher::is_video_file;

/// A file inside a cached torrent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedFile {
    /// Provider-assigned file id.
    pub id: String,
    pub filename: String,
    pub filesize: u64,
}

/// The file listing of one cached torrent variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileGroup {
    /// Files in provider order.
    pub files: Vec<CachedFile>,
}

impl FileGroup {
    pub fn new(files: Vec<CachedFile>) -> Self {
        Self { files }
    }

    /// All file ids, in provider order.
    pub fn file_ids(&self) -> Vec<String> {
        self.files.iter().map(|f| f.id.clone()).collect()
    }

    /// Files with a video extension.
    pub fn video_files(&self) -> impl Iterator<Item = &CachedFile> {
        self.files.iter().filter(|f| is_video_file(&f.filename))
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Cached file groups by lowercase content hash.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailabilityRecord {
    entries: HashMap<String, Vec<FileGroup>>,
}

impl AvailabilityRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add groups for a hash.
    pub fn insert(&mut self, hash: &str, groups: Vec<FileGroup>) {
        self.entries.insert(hash.to_lowercase(), groups);
    }

    /// Groups cached for `hash`; empty when not cached.
    pub fn groups(&self, hash: &str) -> &[FileGroup] {
        self.entries
            .get(&hash.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of hashes with at least one group.
    pub fn cached_count(&self) -> usize {
        self.entries.values().filter(|g| !g.is_empty()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.cached_count() == 0
    }

    /// Parse an instant availability body.
    ///
    /// Shape: `{ hash: { "<host>": [ { file_id: { filename, filesize } } ] } }`.
    /// Entries that are not objects (the provider sends `[]` for misses) are
    /// treated as not cached. Malformed files are skipped.
    pub fn from_json(body: &Value, host_key: &str) -> Result<Self, ApiError> {
        let root = body.as_object().ok_or_else(|| {
            ApiError::InvalidResponse("availability body is not an object".to_string())
        })?;

        let mut record = Self::new();
        for (hash, entry) in root {
            let groups: Vec<FileGroup> = entry
                .get(host_key)
                .and_then(Value::as_array)
                .map(|groups| groups.iter().filter_map(parse_group).collect())
                .unwrap_or_default();

            if !groups.is_empty() {
                record.insert(hash, groups);
            }
        }

        Ok(record)
    }
}

fn parse_group(value: &Value) -> Option<FileGroup> {
    let files: Vec<CachedFile> = value
        .as_object()?
        .iter()
        .filter_map(|(id, file)| {
            Some(CachedFile {
                id: id.clone(),
                filename: file.get("filename")?.as_str()?.to_string(),
                filesize: file.get("filesize").and_then(Value::as_u64).unwrap_or(0),
            })
        })
        .collect();

    (!files.is_empty()).then(|| FileGroup::new(files))
}

/// A direct, time-limited link for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockedLink {
    #[serde(default)]
    pub id: String,
    pub filename: String,
    #[serde(default, rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub filesize: u64,
    /// Provider-hosted link the download was unlocked from.
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub host: String,
    /// Direct stream/download URL.
    pub download: String,
    #[serde(default)]
    pub streamable: u8,
}

/// A debrid caching service.
#[async_trait]
pub trait DebridProvider: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Whether credentials are present.
    async fn is_configured(&self) -> bool;

    /// Ask which of `hashes` are cached, in one call.
    async fn instant_availability(
        &self,
        hashes: &[String],
    ) -> Result<AvailabilityRecord, ApiError>;

    /// Unlock direct links for `file_ids` of the torrent at `source_url`.
    ///
    /// An empty `file_ids` asks for every file.
    async fn unlock(
        &self,
        source_url: &str,
        file_ids: &[String],
    ) -> Result<Vec<UnlockedLink>, ApiError>;
}
