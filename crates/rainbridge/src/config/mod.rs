//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use crate::destination::{KarakeepClient, DEFAULT_KARAKEEP_URL};
use crate::error::Result;
use crate::http::{BackoffPolicy, ReqwestTransport, RequestExecutor, TokioSleeper};
use crate::pagination::Paginator;
use crate::source::{RaindropClient, DEFAULT_RAINDROP_URL};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Environment variable holding the Raindrop.io token.
pub const ENV_RAINDROP_TOKEN: &str = "RAINDROP_API_TOKEN";
/// Environment variable holding the Karakeep token.
pub const ENV_KARAKEEP_TOKEN: &str = "KARAKEEP_API_TOKEN";
/// Optional override of the Raindrop.io base URL.
pub const ENV_RAINDROP_URL: &str = "RAINDROP_BASE_URL";
/// Optional override of the Karakeep base URL.
pub const ENV_KARAKEEP_URL: &str = "KARAKEEP_BASE_URL";

impl Config {
    /// Load configuration from a YAML file, filling missing tokens from the
    /// environment.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&content)?;
        load_dotenv();
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Build configuration from environment variables alone, reading a
    /// `.env` file in the working directory first if one exists.
    pub fn from_env() -> Result<Self> {
        load_dotenv();
        let mut config = Config::default();
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Overlay values from `lookup`.
    ///
    /// Tokens are taken only where the config has none. Base URLs are
    /// replaced only while they still hold the built-in default.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if self.source.token.is_empty() {
            if let Some(token) = lookup(ENV_RAINDROP_TOKEN) {
                self.source.token = token;
            }
        }
        if self.destination.token.is_empty() {
            if let Some(token) = lookup(ENV_KARAKEEP_TOKEN) {
                self.destination.token = token;
            }
        }
        if self.source.base_url == DEFAULT_RAINDROP_URL {
            if let Some(url) = lookup(ENV_RAINDROP_URL) {
                self.source.base_url = url;
            }
        }
        if self.destination.base_url == DEFAULT_KARAKEEP_URL {
            if let Some(url) = lookup(ENV_KARAKEEP_URL) {
                self.destination.base_url = url;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }

    /// Build the retrying executor shared by both clients.
    pub fn executor(&self) -> Result<RequestExecutor> {
        let transport = ReqwestTransport::new(Duration::from_secs(
            self.transfer.request_timeout_secs,
        ))?;
        Ok(RequestExecutor::new(Arc::new(transport), Arc::new(TokioSleeper))
            .with_backoff(BackoffPolicy::new(Duration::from_millis(
                self.transfer.base_delay_ms,
            )))
            .with_max_retries(self.transfer.max_retries))
    }

    /// Raindrop.io client for this configuration.
    pub fn raindrop_client(&self, executor: RequestExecutor) -> RaindropClient {
        RaindropClient::new(&self.source.base_url, &self.source.token, executor)
            .with_paginator(Paginator::with_max_pages(self.transfer.max_pages))
    }

    /// Karakeep client for this configuration.
    pub fn karakeep_client(&self, executor: RequestExecutor) -> KarakeepClient {
        KarakeepClient::new(
            &self.destination.base_url,
            &self.destination.token,
            executor,
        )
    }
}

fn load_dotenv() {
    load_dotenv_from(Path::new("."));
}

/// Read `dir/.env` only; parent directories are not searched. Variables
/// already in the environment win over the file.
fn load_dotenv_from(dir: &Path) {
    let path = dir.join(".env");
    match dotenv::from_path(&path) {
        Ok(()) => debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => debug!("Ignoring unreadable .env file: {}", e),
    }
}
