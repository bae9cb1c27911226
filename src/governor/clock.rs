//! Clock capability for time-dependent components.
//!
//! The governor and retry loop never read the system clock directly; they go
//! through this trait so the rolling-window and burst logic can run under
//! tokio's paused test clock deterministically.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

/// Provides the current instant and the ability to sleep.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> Instant;

    /// Suspend the caller for the given duration.
    async fn sleep(&self, duration: Duration);
}

/// Production clock backed by tokio's timer.
///
/// Under `#[tokio::test(start_paused = true)]` this follows virtual time, so
/// tests exercise the real implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
