//! Candidate torrent sources and content hash normalization.
//!
//! Candidates are produced upstream (indexers, addons) and carried through
//! cache resolution. Their content hash is the cache lookup key.

mod hash;
mod types;

pub use hash::{collect_hashes, extract_hash_from_url, normalize_hash};
pub use types::*;
