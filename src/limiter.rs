//! Request pacing
//!
//! Every outbound fetch waits on a [`RateLimiter`] first. The default is a
//! [`DelayLimiter`], which sleeps a fixed duration before each call, including
//! the very first one, so a batch can never burst.

use std::time::Duration;

use tokio::time::sleep;

/// Trait for implementing rate limiting strategies
#[async_trait::async_trait]
pub trait RateLimiter: Send + Sync {
    /// Wait until a request is allowed
    async fn acquire(&self);

    /// The pause this limiter applies before each request
    fn delay(&self) -> Duration;
}

/// Fixed delay before every request
#[derive(Debug, Clone)]
pub struct DelayLimiter {
    delay: Duration,
}

impl DelayLimiter {
    /// Create a new DelayLimiter
    ///
    /// # Arguments
    /// * `delay` - Duration to wait before each request
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait::async_trait]
impl RateLimiter for DelayLimiter {
    async fn acquire(&self) {
        sleep(self.delay).await;
    }

    fn delay(&self) -> Duration {
        self.delay
    }
}

/// No pacing at all; meant for tests against local servers
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait::async_trait]
impl RateLimiter for NoDelay {
    async fn acquire(&self) {}

    fn delay(&self) -> Duration {
        Duration::ZERO
    }
}
