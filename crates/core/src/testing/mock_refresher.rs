//! Scripted credential refresher for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::api::{CredentialRefresher, RefreshError};

/// A refresher that always returns the same result and counts calls.
#[derive(Debug)]
pub struct ScriptedRefresher {
    result: Result<String, RefreshError>,
    calls: AtomicUsize,
}

impl ScriptedRefresher {
    /// Refreshes successfully to `token`.
    pub fn succeeding(token: &str) -> Self {
        Self {
            result: Ok(token.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(RefreshError(message.to_string())),
            calls: AtomicUsize::new(0),
        }
    }

    /// How many times refresh was called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialRefresher for ScriptedRefresher {
    async fn refresh(&self) -> Result<String, RefreshError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}
