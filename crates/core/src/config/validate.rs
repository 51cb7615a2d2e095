use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Provider URLs are not empty
/// - Timeouts are not 0
/// - Real-Debrid unlock polling makes at least one attempt
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if let Some(rd) = &config.real_debrid {
        if rd.api_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "real_debrid.api_url cannot be empty".to_string(),
            ));
        }
        if rd.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "real_debrid.timeout_secs cannot be 0".to_string(),
            ));
        }
        if rd.unlock_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "real_debrid.unlock_attempts cannot be 0".to_string(),
            ));
        }
    }

    if let Some(ad) = &config.all_debrid {
        if ad.api_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "all_debrid.api_url cannot be empty".to_string(),
            ));
        }
        if ad.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "all_debrid.timeout_secs cannot be 0".to_string(),
            ));
        }
    }

    Ok(())
}
