use serde::{Deserialize, Serialize};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub real_debrid: Option<RealDebridConfig>,
    #[serde(default)]
    pub all_debrid: Option<AllDebridConfig>,
    #[serde(default)]
    pub resolver: ResolverConfig,
}

/// Real-Debrid provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RealDebridConfig {
    /// REST API base URL (default: "https://api.real-debrid.com/rest/1.0")
    #[serde(default = "default_real_debrid_url")]
    pub api_url: String,
    /// Bearer token. Empty means the integration is disabled.
    #[serde(default)]
    pub api_token: String,
    /// Per-call timeout in seconds (default: 40)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// Serialize requests through a single queue (default: true)
    #[serde(default = "default_true")]
    pub queue_enabled: bool,
    /// Wait before retrying a 429 response
    #[serde(default)]
    pub rate_limit_wait_ms: Option<u64>,
    /// Minimum spacing between consecutive requests
    #[serde(default)]
    pub inter_request_wait_ms: Option<u64>,
    /// How long instant availability responses are cached
    #[serde(default)]
    pub availability_cache_secs: Option<u64>,
    /// Torrent info polls while waiting for a cached torrent to settle (default: 2)
    #[serde(default = "default_unlock_attempts")]
    pub unlock_attempts: u32,
    /// Delay between torrent info polls (default: 1500)
    #[serde(default = "default_unlock_retry_delay_ms")]
    pub unlock_retry_delay_ms: u64,
}

impl RealDebridConfig {
    /// Create a config with defaults and the given token.
    pub fn with_token(api_token: impl Into<String>) -> Self {
        Self {
            api_url: default_real_debrid_url(),
            api_token: api_token.into(),
            timeout_secs: default_timeout(),
            queue_enabled: true,
            rate_limit_wait_ms: None,
            inter_request_wait_ms: None,
            availability_cache_secs: None,
            unlock_attempts: default_unlock_attempts(),
            unlock_retry_delay_ms: default_unlock_retry_delay_ms(),
        }
    }
}

fn default_real_debrid_url() -> String {
    "https://api.real-debrid.com/rest/1.0".to_string()
}

fn default_timeout() -> u32 {
    40
}

fn default_true() -> bool {
    true
}

fn default_unlock_attempts() -> u32 {
    2
}

fn default_unlock_retry_delay_ms() -> u64 {
    1500
}

/// AllDebrid provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AllDebridConfig {
    /// API base URL (default: "https://api.alldebrid.com/v4")
    #[serde(default = "default_all_debrid_url")]
    pub api_url: String,
    /// API key
    pub api_key: String,
    /// Agent name sent with every request (default: "debridlink")
    #[serde(default = "default_agent")]
    pub agent: String,
    /// Request timeout in seconds (default: 40)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_all_debrid_url() -> String {
    "https://api.alldebrid.com/v4".to_string()
}

fn default_agent() -> String {
    "debridlink".to_string()
}

/// Resolver presentation settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverConfig {
    /// Label stamped on cached sources and used as the result id prefix
    #[serde(default = "default_service_label")]
    pub service_label: String,
    /// Header shown when asking for a file choice
    #[serde(default = "default_selection_header")]
    pub selection_header: String,
    /// Label of the cancel option
    #[serde(default = "default_cancel_label")]
    pub cancel_label: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            service_label: default_service_label(),
            selection_header: default_selection_header(),
            cancel_label: default_cancel_label(),
        }
    }
}

fn default_service_label() -> String {
    "RD".to_string()
}

fn default_selection_header() -> String {
    "Select a file".to_string()
}

fn default_cancel_label() -> String {
    "Cancel".to_string()
}

/// Sanitized config for display (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub real_debrid: Option<SanitizedRealDebridConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_debrid: Option<SanitizedAllDebridConfig>,
    pub resolver: ResolverConfig,
}

/// Sanitized Real-Debrid config (token hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedRealDebridConfig {
    pub api_url: String,
    pub api_token_configured: bool,
    pub timeout_secs: u32,
    pub queue_enabled: bool,
}

/// Sanitized AllDebrid config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAllDebridConfig {
    pub api_url: String,
    pub api_key_configured: bool,
    pub agent: String,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            real_debrid: config
                .real_debrid
                .as_ref()
                .map(|rd| SanitizedRealDebridConfig {
                    api_url: rd.api_url.clone(),
                    api_token_configured: !rd.api_token.is_empty(),
                    timeout_secs: rd.timeout_secs,
                    queue_enabled: rd.queue_enabled,
                }),
            all_debrid: config.all_debrid.as_ref().map(|ad| SanitizedAllDebridConfig {
                api_url: ad.api_url.clone(),
                api_key_configured: !ad.api_key.is_empty(),
                agent: ad.agent.clone(),
            }),
            resolver: config.resolver.clone(),
        }
    }
}
