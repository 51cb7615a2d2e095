//! Resilient API client for debrid providers.
//!
//! The [`ApiClient`] wraps a base URL and an [`AuthContext`], builds request
//! headers at call time and recovers once from an expired credential (401)
//! through an injected [`CredentialRefresher`]. Actual I/O goes through an
//! [`HttpTransport`]; [`ReqwestTransport`] is the production implementation
//! and honours the cache, timeout and throttling knobs in [`RequestOptions`].

mod auth;
mod cache;
mod client;
mod reqwest_transport;
mod types;

pub use auth::{AuthContext, CredentialRefresher, RefreshError};
pub use cache::ResponseCache;
pub use client::ApiClient;
pub use reqwest_transport::ReqwestTransport;
pub use types::*;
