//! Configuration type definitions.

use crate::destination::DEFAULT_KARAKEEP_URL;
use crate::http::{DEFAULT_BASE_DELAY, DEFAULT_MAX_RETRIES};
use crate::source::DEFAULT_RAINDROP_URL;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Raindrop.io account to read from.
    #[serde(default)]
    pub source: SourceConfig,

    /// Karakeep instance to write to.
    #[serde(default)]
    pub destination: DestinationConfig,

    /// Transfer behavior configuration.
    #[serde(default)]
    pub transfer: TransferConfig,
}

/// Source (Raindrop.io) configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// API base URL (default: Raindrop.io REST v1).
    #[serde(default = "default_raindrop_url")]
    pub base_url: String,

    /// Bearer token.
    #[serde(default)]
    pub token: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_raindrop_url(),
            token: String::new(),
        }
    }
}

impl fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceConfig")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Destination (Karakeep) configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct DestinationConfig {
    /// API base URL (default: hosted Karakeep v1).
    #[serde(default = "default_karakeep_url")]
    pub base_url: String,

    /// Bearer token.
    #[serde(default)]
    pub token: String,
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            base_url: default_karakeep_url(),
            token: String::new(),
        }
    }
}

impl fmt::Debug for DestinationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DestinationConfig")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Transfer behavior configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Items of one folder processed concurrently (default: 1).
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Retries after a 429 before giving up (default: 5).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// First backoff delay in milliseconds, doubled per retry (default: 1000).
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Stop paginating after this many pages. Unbounded when unset.
    #[serde(default)]
    pub max_pages: Option<usize>,

    /// Per-request timeout in seconds (default: 30).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            max_pages: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

// Default value functions

fn default_raindrop_url() -> String {
    DEFAULT_RAINDROP_URL.to_string()
}

fn default_karakeep_url() -> String {
    DEFAULT_KARAKEEP_URL.to_string()
}

fn default_workers() -> usize {
    1
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_base_delay_ms() -> u64 {
    DEFAULT_BASE_DELAY.as_millis() as u64
}

fn default_request_timeout_secs() -> u64 {
    30
}
