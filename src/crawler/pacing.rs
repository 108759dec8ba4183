//! Pacing between consecutive term fetches
//!
//! The scheduler suspends between every pair of consecutive term fetches as
//! a politeness throttle toward the content source. The delay is an
//! injected abstraction so tests can run with no delay without touching
//! scheduler logic.

use async_trait::async_trait;
use std::time::Duration;

/// Cooperative delay between consecutive term fetches
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, interval: Duration);
}

/// Suspends for the full interval via the runtime timer
pub struct FixedDelay;

#[async_trait]
impl Pacer for FixedDelay {
    async fn pause(&self, interval: Duration) {
        if !interval.is_zero() {
            tokio::time::sleep(interval).await;
        }
    }
}

/// Returns immediately regardless of the interval (for tests)
pub struct NoDelay;

#[async_trait]
impl Pacer for NoDelay {
    async fn pause(&self, _interval: Duration) {}
}
