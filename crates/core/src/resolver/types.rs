//! Resolver output types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::deferred::DeferredLinks;
use crate::api::ApiError;
use crate::provider::UnlockedLink;

/// Errors surfaced when a stream link is requested.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("debrid API error: {0}")]
    Api(#[from] ApiError),

    #[error("provider returned no links")]
    NoLinks,

    #[error("internal error: {0}")]
    Internal(String),
}

/// How a stream link result is sourced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    CachedTorrent,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::CachedTorrent => "cached_torrent",
        }
    }
}

/// Terminal state of a deferred link computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// Direct links for the chosen content.
    Links(Vec<UnlockedLink>),
    /// The user cancelled the file choice. Not an error.
    Cancelled,
}

impl LinkOutcome {
    pub fn links(&self) -> &[UnlockedLink] {
        match self {
            LinkOutcome::Links(links) => links,
            LinkOutcome::Cancelled => &[],
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, LinkOutcome::Cancelled)
    }
}

/// A cached release ready for playback.
///
/// Nothing is unlocked until [`DeferredLinks::fetch`] is called on `links`.
#[derive(Debug, Clone, Serialize)]
pub struct StreamLinkResult {
    /// `"<service label>-<hash>"`.
    pub id: String,
    pub title: String,
    pub size: u64,
    pub quality: String,
    pub kind: SourceKind,
    pub is_package: bool,
    pub service: String,
    pub provider: String,
    pub url: String,
    pub hash: String,
    #[serde(skip)]
    pub links: DeferredLinks,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&SourceKind::CachedTorrent).unwrap();
        assert_eq!(json, r#""cached_torrent""#);
        assert_eq!(SourceKind::CachedTorrent.as_str(), "cached_torrent");
    }

    #[test]
    fn test_cancelled_has_no_links() {
        assert!(LinkOutcome::Cancelled.links().is_empty());
        assert!(LinkOutcome::Cancelled.is_cancelled());
    }

    #[test]
    fn test_api_error_converts() {
        let err: ResolveError = ApiError::Timeout.into();
        assert_eq!(err, ResolveError::Api(ApiError::Timeout));
    }
}
