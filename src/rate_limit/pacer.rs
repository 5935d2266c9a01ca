//! Minimum-interval pacing between consecutive requests.

use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::debug;

/// Enforces a minimum wall-clock gap between the starts of consecutive
/// requests made through one instance.
///
/// The lock is held across the sleep, so callers are serialized and each
/// one observes the gap relative to the previous caller's start.
#[derive(Debug)]
pub struct RequestPacer {
    interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RequestPacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_request: Mutex::new(None),
        }
    }

    /// Time left before the next request may start.
    fn time_until_ready(last: Option<Instant>, interval: Duration) -> Duration {
        match last {
            Some(last) => interval.saturating_sub(last.elapsed()),
            None => Duration::ZERO,
        }
    }

    /// Wait until the interval has elapsed, then mark a request as started.
    ///
    /// Returns the instant recorded as the start of this request.
    pub async fn wait(&self) -> Instant {
        let mut last = self.last_request.lock().await;
        let wait = Self::time_until_ready(*last, self.interval);
        if !wait.is_zero() {
            debug!("Waiting {:.1}s to respect the request interval", wait.as_secs_f64());
            tokio::time::sleep(wait).await;
        }
        let now = Instant::now();
        *last = Some(now);
        now
    }
}
