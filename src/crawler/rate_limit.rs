//! Global request pacing
//!
//! One gate is shared by the whole worker pool: any two fetch dispatches are
//! separated by at least the configured delay, whatever the concurrency.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// Interval gate acquired before every fetch
#[derive(Debug)]
pub struct RateLimiter {
    delay: Duration,
    last_dispatch: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_dispatch: Mutex::new(None),
        }
    }

    /// Waits until the next dispatch slot and claims it
    ///
    /// Callers queue on the gate in arrival order. Dropping the returned
    /// future before it completes gives up the place without claiming a slot.
    /// A delay too large to add to the clock never lets a second caller through.
    pub async fn acquire(&self) {
        let mut last = self.last_dispatch.lock().await;
        if let Some(previous) = *last {
            match previous.checked_add(self.delay) {
                Some(ready_at) => {
                    if Instant::now() < ready_at {
                        tracing::trace!("Rate limit: waiting {:?}", ready_at - Instant::now());
                        sleep_until(ready_at).await;
                    }
                }
                None => std::future::pending::<()>().await,
            }
        }
        *last = Some(Instant::now());
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}
