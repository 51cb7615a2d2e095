//! Testing utilities and mock implementations.
//!
//! Mocks for the transport, credential refresh, provider and selection
//! seams, so the resolver can be exercised without a network or a UI.
//!
//! # Example
//!
//! ```rust,ignore
//! use debridlink_core::testing::{fixtures, MockDebridProvider, ScriptedSelector};
//!
//! let provider = Arc::new(MockDebridProvider::new());
//! provider.set_cached(fixtures::HASH_A, vec![fixtures::group(&[("1", "a.mkv", 10)])]).await;
//!
//! let resolver = DebridResolver::new(provider, Arc::new(ScriptedSelector::choosing(0)), Default::default());
//! ```

mod mock_provider;
mod mock_refresher;
mod mock_selector;
mod mock_transport;

pub use mock_provider::{MockDebridProvider, RecordedUnlock};
pub use mock_refresher::ScriptedRefresher;
pub use mock_selector::{RecordedPrompt, ScriptedSelector};
pub use mock_transport::{MockTransport, RecordedRequest};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::provider::{CachedFile, FileGroup, UnlockedLink};
    use crate::source::CandidateRelease;

    pub const HASH_A: &str = "c12fe1c06bba254a9dc9f519b335aa7c1367a88a";
    pub const HASH_B: &str = "dd8255ecdc7ca55fb0bbf81323d87062db1f6d1c";
    pub const HASH_C: &str = "08ada5a7a6183aae1e09d831df6748d566095a10";

    /// Magnet link for a hash.
    pub fn magnet(hash: &str) -> String {
        format!("magnet:?xt=urn:btih:{}&dn=release", hash)
    }

    /// A candidate whose hash is only derivable from its magnet URL.
    pub fn candidate(title: &str, hash: &str) -> CandidateRelease {
        CandidateRelease::new(title, magnet(hash))
            .with_size(1024 * 1024 * 1024) // 1 GB
            .with_quality("1080p")
            .with_provider("mock-indexer")
    }

    /// A file group from (id, filename, size) triples.
    pub fn group(files: &[(&str, &str, u64)]) -> FileGroup {
        FileGroup::new(
            files
                .iter()
                .map(|(id, filename, filesize)| CachedFile {
                    id: id.to_string(),
                    filename: filename.to_string(),
                    filesize: *filesize,
                })
                .collect(),
        )
    }

    /// An unlocked link for a file.
    pub fn unlocked_link(filename: &str, filesize: u64) -> UnlockedLink {
        UnlockedLink {
            id: format!("L-{}", filename),
            filename: filename.to_string(),
            mime_type: Some("video/x-matroska".to_string()),
            filesize,
            link: format!("https://debrid.test/d/{}", filename),
            host: "debrid.test".to_string(),
            download: format!("https://download.debrid.test/{}", filename),
            streamable: 1,
        }
    }
}
