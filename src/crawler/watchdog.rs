//! Idle watchdog
//!
//! Polls the shared crawl state and fires once nothing has happened for
//! longer than the idle timeout. Activity is a completed fetch or a newly
//! enqueued URL.

use crate::state::CrawlState;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

#[derive(Debug, Clone)]
pub struct IdleWatchdog {
    timeout: Duration,
    check_interval: Duration,
}

impl IdleWatchdog {
    /// Creates a watchdog
    ///
    /// # Arguments
    ///
    /// * `timeout` - Inactivity after which the watchdog fires
    /// * `check_interval` - How often the idle clock is compared; should be
    ///   a fraction of `timeout`
    pub fn new(timeout: Duration, check_interval: Duration) -> Self {
        Self {
            timeout,
            check_interval: check_interval.max(Duration::from_millis(1)),
        }
    }

    /// Resolves once the crawl has been idle for longer than the timeout
    ///
    /// Dropping the future cancels the watchdog.
    ///
    /// # Returns
    ///
    /// How long the crawl had been idle when the watchdog fired
    pub async fn expired(&self, state: &CrawlState) -> Duration {
        let mut ticker = interval(self.check_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let idle = state.idle_for();
            if idle > self.timeout {
                tracing::debug!("No activity for {:?}, idle timeout reached", idle);
                return idle;
            }
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
