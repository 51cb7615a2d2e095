//! Credentials shared by every request of one provider client.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::metrics;

#[derive(Debug, Clone, Error)]
#[error("Credential refresh failed: {0}")]
pub struct RefreshError(pub String);

/// Obtains a fresh access token after the provider rejected the current one.
///
/// Implemented by whatever owns the provider's authorization flow.
#[async_trait]
pub trait CredentialRefresher: Send + Sync {
    /// Return a new bearer token.
    async fn refresh(&self) -> Result<String, RefreshError>;
}

/// Bearer token plus an optional refresh capability.
pub struct AuthContext {
    token: RwLock<Option<String>>,
    refresher: Option<Arc<dyn CredentialRefresher>>,
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("token", &"<redacted>")
            .field("refresher", &self.refresher.is_some())
            .finish()
    }
}

impl AuthContext {
    /// Create a context with an optional token. Empty tokens count as absent.
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: RwLock::new(token.filter(|t| !t.is_empty())),
            refresher: None,
        }
    }

    /// Context without credentials.
    pub fn anonymous() -> Self {
        Self::new(None)
    }

    /// Register the refresh capability.
    pub fn with_refresher(mut self, refresher: Arc<dyn CredentialRefresher>) -> Self {
        self.refresher = Some(refresher);
        self
    }

    /// Current token.
    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// Whether a token is present.
    pub async fn has_token(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// Replace the token.
    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token.filter(|t| !t.is_empty());
    }

    /// Whether a refresh capability is registered.
    pub fn can_refresh(&self) -> bool {
        self.refresher.is_some()
    }

    /// Run the refresh capability once and store the new token.
    pub async fn refresh(&self) -> Result<(), RefreshError> {
        let refresher = self
            .refresher
            .as_ref()
            .ok_or_else(|| RefreshError("no refresher registered".to_string()))?;

        match refresher.refresh().await {
            Ok(token) => {
                debug!("Credentials refreshed");
                self.set_token(Some(token)).await;
                metrics::CREDENTIAL_REFRESHES
                    .with_label_values(&["success"])
                    .inc();
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Credential refresh failed");
                metrics::CREDENTIAL_REFRESHES
                    .with_label_values(&["failed"])
                    .inc();
                Err(e)
            }
        }
    }

    /// Headers for a request made now.
    pub async fn headers(&self) -> Vec<(String, String)> {
        let mut headers = vec![(
            "Content-Type".to_string(),
            "application/x-www-form-urlencoded".to_string(),
        )];

        if let Some(token) = self.token().await {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }

        headers
    }
}
