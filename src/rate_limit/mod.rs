//! Sliding-window call throttle.
//!
//! Admits at most `max_calls` acquisitions per `window`. A caller that would
//! exceed the window waits until the oldest call ages out, then proceeds.

mod clock;

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::debug;

pub use clock::{Clock, ManualClock, SystemClock};

/// Default window length.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Configuration for the call throttle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Calls admitted per window.
    pub max_calls: u32,
    /// Window length.
    pub window: Duration,
}

impl RateLimitConfig {
    pub fn per_minute(max_calls: u32) -> Self {
        Self {
            max_calls,
            window: DEFAULT_WINDOW,
        }
    }
}

/// Statistics for the throttle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitStats {
    pub total_calls: u64,
    pub throttled_calls: u64,
    pub total_wait: Duration,
}

#[derive(Debug, Default)]
struct WindowState {
    calls: VecDeque<Instant>,
    stats: RateLimitStats,
}

impl WindowState {
    fn prune(&mut self, now: Instant, window: Duration) {
        while let Some(&oldest) = self.calls.front() {
            if now.saturating_duration_since(oldest) >= window {
                self.calls.pop_front();
            } else {
                break;
            }
        }
    }

    /// Time until a slot frees, or zero when one is free now.
    fn time_until_ready(&self, now: Instant, config: &RateLimitConfig) -> Duration {
        if (self.calls.len() as u64) < u64::from(config.max_calls.max(1)) {
            return Duration::ZERO;
        }
        match self.calls.front() {
            Some(&oldest) => (oldest + config.window).saturating_duration_since(now),
            None => Duration::ZERO,
        }
    }
}

/// Sliding-window rate limiter shared by every remote call in a run.
pub struct RateLimiter {
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
    state: Arc<Mutex<WindowState>>,
}

impl RateLimiter {
    /// Create a limiter on the system clock.
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a limiter on a custom clock.
    pub fn with_clock(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            state: Arc::new(Mutex::new(WindowState::default())),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Wait until a call is permitted, then record it. Returns the time waited.
    pub async fn acquire(&self) -> Duration {
        let mut waited = Duration::ZERO;

        loop {
            let wait = {
                let mut state = self.state.lock().await;
                let now = self.clock.now();
                state.prune(now, self.config.window);

                let wait = state.time_until_ready(now, &self.config);
                if wait == Duration::ZERO {
                    state.calls.push_back(now);
                    state.stats.total_calls += 1;
                    if waited > Duration::ZERO {
                        state.stats.throttled_calls += 1;
                        state.stats.total_wait += waited;
                    }
                    return waited;
                }
                wait
            };

            debug!(
                "Rate limit reached ({} calls per {:?}): waiting {:?}",
                self.config.max_calls, self.config.window, wait
            );
            self.clock.sleep(wait).await;
            waited += wait;
        }
    }

    pub async fn stats(&self) -> RateLimitStats {
        self.state.lock().await.stats
    }
}

impl Clone for RateLimiter {
    fn clone(&self) -> Self {
        Self {
            config: self.config,
            clock: self.clock.clone(),
            state: self.state.clone(),
        }
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_calls: u32, window_ms: u64) -> (RateLimiter, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let limiter = RateLimiter::with_clock(
            RateLimitConfig {
                max_calls,
                window: Duration::from_millis(window_ms),
            },
            clock.clone(),
        );
        (limiter, clock)
    }

    #[tokio::test]
    async fn test_admits_up_to_max_without_waiting() {
        let (limiter, clock) = limiter(3, 1000);

        for _ in 0..3 {
            assert_eq!(limiter.acquire().await, Duration::ZERO);
        }
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_waits_for_oldest_call_to_leave_window() {
        let (limiter, clock) = limiter(2, 1000);

        limiter.acquire().await;
        clock.advance(Duration::from_millis(300));
        limiter.acquire().await;

        let waited = limiter.acquire().await;
        assert_eq!(waited, Duration::from_millis(700));
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(700)]);

        let stats = limiter.stats().await;
        assert_eq!(stats.total_calls, 3);
        assert_eq!(stats.throttled_calls, 1);
        assert_eq!(stats.total_wait, Duration::from_millis(700));
    }

    #[tokio::test]
    async fn test_window_frees_after_elapsed_time() {
        let (limiter, clock) = limiter(1, 500);

        limiter.acquire().await;
        clock.advance(Duration::from_millis(500));
        assert_eq!(limiter.acquire().await, Duration::ZERO);
    }

    #[tokio::test]
    async fn test_clones_share_window() {
        let (limiter, _clock) = limiter(1, 1000);
        let other = limiter.clone();

        limiter.acquire().await;
        assert_eq!(other.acquire().await, Duration::from_millis(1000));
    }

    #[test]
    fn test_per_minute() {
        let config = RateLimitConfig::per_minute(6000);
        assert_eq!(config.max_calls, 6000);
        assert_eq!(config.window, Duration::from_secs(60));
    }
}
