//! Rate-limit-aware request execution.

use super::{ApiRequest, ApiResponse, BackoffPolicy, Sleeper, StatusCode, Transport};
use crate::error::{BridgeError, Result};
use std::sync::Arc;
use tracing::{debug, warn};

/// Retries allowed after the first 429 before giving up.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Sends requests through a [`Transport`], retrying HTTP 429 responses with
/// exponential backoff.
///
/// Transport failures are returned immediately and any status other than 429
/// is handed back untouched; the caller decides what counts as success. The
/// executor holds no per-call state, so one instance can be cloned and shared
/// across concurrent tasks.
#[derive(Clone)]
pub struct RequestExecutor {
    transport: Arc<dyn Transport>,
    sleeper: Arc<dyn Sleeper>,
    backoff: BackoffPolicy,
    max_retries: u32,
}

impl RequestExecutor {
    /// Create an executor with the default backoff policy and retry cap.
    pub fn new(transport: Arc<dyn Transport>, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            transport,
            sleeper,
            backoff: BackoffPolicy::default(),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Send `request`, retrying while the remote answers 429.
    pub async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let mut attempt: u32 = 0;

        loop {
            debug!("{} {}", request.method, request.url);
            let response = self.transport.send(request).await?;

            if response.status != StatusCode::TOO_MANY_REQUESTS {
                return Ok(response);
            }

            // Body is dropped with the response before we wait.
            let status = response.status_line();
            drop(response);

            if attempt >= self.max_retries {
                return Err(BridgeError::RateLimitExhausted {
                    retries: self.max_retries,
                    status,
                });
            }

            let delay = self.backoff.delay(attempt);
            warn!(
                "Rate limited (429), retrying in {:?} (attempt {}/{})",
                delay,
                attempt + 1,
                self.max_retries
            );
            self.sleeper.sleep(delay).await;
            attempt += 1;
        }
    }
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("backoff", &self.backoff)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}
