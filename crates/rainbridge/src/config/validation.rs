//! Configuration validation.

use super::Config;
use crate::error::{BridgeError, Result};

/// Highest accepted `transfer.max_retries`. The last sleep at the default
/// base delay is then about 9 minutes.
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    // Source validation
    if config.source.token.is_empty() {
        return Err(BridgeError::Config(
            "source.token is required (or set RAINDROP_API_TOKEN)".into(),
        ));
    }
    check_url("source.base_url", &config.source.base_url)?;

    // Destination validation
    if config.destination.token.is_empty() {
        return Err(BridgeError::Config(
            "destination.token is required (or set KARAKEEP_API_TOKEN)".into(),
        ));
    }
    check_url("destination.base_url", &config.destination.base_url)?;

    // Transfer validation
    if config.transfer.workers == 0 {
        return Err(BridgeError::Config(
            "transfer.workers must be at least 1".into(),
        ));
    }
    if let Some(0) = config.transfer.max_pages {
        return Err(BridgeError::Config(
            "transfer.max_pages must be at least 1".into(),
        ));
    }
    if config.transfer.max_retries > MAX_RETRIES_LIMIT {
        return Err(BridgeError::Config(format!(
            "transfer.max_retries must be at most {}, got {}",
            MAX_RETRIES_LIMIT, config.transfer.max_retries
        )));
    }
    if config.transfer.request_timeout_secs == 0 {
        return Err(BridgeError::Config(
            "transfer.request_timeout_secs must be at least 1".into(),
        ));
    }

    Ok(())
}

fn check_url(field: &str, url: &str) -> Result<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(BridgeError::Config(format!(
            "{} must start with http:// or https://, got '{}'",
            field, url
        )))
    }
}
