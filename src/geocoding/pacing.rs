//! Request pacing for the geocoding service

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::debug;

/// Keeps consecutive requests at least `min_interval` apart.
///
/// A caller arriving early waits out the remainder instead of failing. The
/// lock is held while waiting, so concurrent callers are released one at a
/// time.
#[derive(Debug)]
pub struct RequestPacer {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RequestPacer {
    /// Create a new pacer
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// Time until the next request would be allowed
    pub async fn time_until_next_request(&self) -> Duration {
        let last = self.last_request.lock().await;
        Self::remaining(self.min_interval, *last)
    }

    /// Wait until a request is allowed and record it
    pub async fn wait_turn(&self) {
        let mut last = self.last_request.lock().await;
        let wait = Self::remaining(self.min_interval, *last);
        if !wait.is_zero() {
            debug!("Pacing geocoding request, waiting {:.3}s", wait.as_secs_f64());
            sleep(wait).await;
        }
        *last = Some(Instant::now());
    }

    fn remaining(min_interval: Duration, last: Option<Instant>) -> Duration {
        last.map_or(Duration::ZERO, |previous| {
            min_interval.saturating_sub(previous.elapsed())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_request_is_immediate() {
        let pacer = RequestPacer::new(Duration::from_secs(1));
        assert_eq!(pacer.time_until_next_request().await, Duration::ZERO);

        let start = Instant::now();
        pacer.wait_turn().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_request_waits_remaining_interval() {
        let pacer = RequestPacer::new(Duration::from_secs(1));
        pacer.wait_turn().await;

        tokio::time::advance(Duration::from_millis(400)).await;
        assert_eq!(
            pacer.time_until_next_request().await,
            Duration::from_millis(600)
        );

        let start = Instant::now();
        pacer.wait_turn().await;
        let waited = start.elapsed();
        assert!(waited >= Duration::from_millis(600));
        assert!(waited < Duration::from_millis(700));
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_requests_do_not_wait() {
        let pacer = RequestPacer::new(Duration::from_secs(1));
        pacer.wait_turn().await;
        tokio::time::advance(Duration::from_secs(2)).await;

        let start = Instant::now();
        pacer.wait_turn().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
