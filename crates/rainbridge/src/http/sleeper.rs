//! Pluggable sleep capability used between retries.

use async_trait::async_trait;
use std::time::Duration;

/// Waits for a duration. Injected into the executor so tests can record
/// retry delays instead of waiting them out.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
