//! Time source for the status poller
//!
//! Polling waits between attempts; tests swap the real clock for one that
//! returns immediately so a full timeout runs in microseconds.

use async_trait::async_trait;
use std::time::Duration;

/// Something that can wait
#[async_trait]
pub trait Clock: Send + Sync {
    /// Wait for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by tokio's timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
