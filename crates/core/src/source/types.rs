//! Types for candidate torrent sources.

use serde::{Deserialize, Serialize};

/// A torrent-like media release prior to cache resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRelease {
    /// Release title as reported by the source provider.
    pub title: String,
    /// Magnet or torrent URL. Used as the unlock key.
    pub url: String,
    /// Content hash, if known. Filled by [`normalize_hash`](super::normalize_hash).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    /// Size in bytes.
    #[serde(default)]
    pub size: u64,
    /// Quality label (e.g. "1080p").
    #[serde(default)]
    pub quality: String,
    /// Whether the release is a season/series package.
    #[serde(default)]
    pub is_package: bool,
    /// Name of the provider that found this release.
    #[serde(default)]
    pub provider: String,
    /// Set by the resolver when the debrid service has this release cached.
    #[serde(default)]
    pub is_cached: bool,
    /// Label of the service that has this release cached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_service: Option<String>,
}

impl CandidateRelease {
    /// Create a candidate from a title and URL with default metadata.
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            hash: None,
            size: 0,
            quality: String::new(),
            is_package: false,
            provider: String::new(),
            is_cached: false,
            cached_service: None,
        }
    }

    /// Set an explicit content hash.
    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    /// Set the size in bytes.
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    /// Set the quality label.
    pub fn with_quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = quality.into();
        self
    }

    /// Set the provider name.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    /// Mark the release as a package.
    pub fn with_package(mut self, is_package: bool) -> Self {
        self.is_package = is_package;
        self
    }

    /// The hash usable as a cache key, if any.
    pub fn cache_key(&self) -> Option<String> {
        self.hash
            .as_deref()
            .filter(|h| !h.is_empty())
            .map(|h| h.to_lowercase())
    }
}
