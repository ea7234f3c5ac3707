use std::time::Duration;

use tokio::time::Instant;
use tracing::info;

/// Fixed-window request limiter: at most `max_requests` per `window`.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    requests_made: u32,
    window_start: Instant,
}

impl RateLimiter {
    pub fn per_minute(max_requests: u32) -> Self {
        Self::new(max_requests, Duration::from_secs(60))
    }

    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests: max_requests.max(1),
            window,
            requests_made: 0,
            window_start: Instant::now(),
        }
    }

    /// Sleeps until the current window has room, then records one request.
    pub async fn wait_if_needed(&mut self) {
        let elapsed = self.window_start.elapsed();
        if elapsed >= self.window {
            self.requests_made = 0;
            self.window_start = Instant::now();
        } else if self.requests_made >= self.max_requests {
            let wait = self.window - elapsed;
            info!(wait_secs = wait.as_secs_f32(), "⏳ Rate limit reached, waiting");
            tokio::time::sleep(wait).await;
            self.requests_made = 0;
            self.window_start = Instant::now();
        }
        self.requests_made += 1;
    }

    pub fn requests_made(&self) -> u32 {
        self.requests_made
    }
}
