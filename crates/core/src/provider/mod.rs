//! Debrid provider integrations.
//!
//! A [`DebridProvider`] answers two questions for the resolver: which
//! content hashes are already cached, and what the direct links for a cached
//! torrent's files are.

mod all_debrid;
mod real_debrid;
mod types;

pub use all_debrid::{AllDebridClient, MagnetStatusFilter, MagnetStatusResponse};
pub use real_debrid::RealDebridProvider;
pub use types::*;
