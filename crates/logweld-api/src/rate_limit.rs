//! Rolling one-minute request rate limiter.
//!
//! The limiter tracks a request count and the instant the current window
//! started. When the count hits the configured ceiling before the window
//! elapses, [`RateLimiter::acquire`] sleeps out the remainder of the window
//! and starts a fresh one. Nothing here is fair or concurrent — the pipeline
//! issues requests strictly sequentially — but the state sits behind an
//! async mutex so the client can hold the limiter behind `&self`.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

const WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct Window {
    count: u32,
    started: Instant,
}

/// Requests-per-minute ceiling enforcement.
#[derive(Debug)]
pub struct RateLimiter {
    max_per_minute: u32,
    state: Mutex<Window>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(max_per_minute: u32) -> Self {
        RateLimiter {
            max_per_minute,
            state: Mutex::new(Window {
                count: 0,
                started: Instant::now(),
            }),
        }
    }

    /// Reserves one request slot, sleeping if the current window is full.
    ///
    /// If sixty seconds have elapsed since the window started, the counter
    /// resets. If the counter has reached the ceiling, this sleeps for the
    /// remaining seconds of the window before resetting and proceeding.
    pub async fn acquire(&self) {
        let mut window = self.state.lock().await;

        if window.started.elapsed() >= WINDOW {
            window.count = 0;
            window.started = Instant::now();
        }

        if window.count >= self.max_per_minute {
            let remaining = WINDOW.saturating_sub(window.started.elapsed());
            if !remaining.is_zero() {
                tracing::info!(
                    sleep_secs = remaining.as_secs_f64(),
                    max_per_minute = self.max_per_minute,
                    "rate ceiling reached, sleeping out the window"
                );
                tokio::time::sleep(remaining).await;
            }
            window.count = 0;
            window.started = Instant::now();
        }

        window.count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // start_paused makes tokio's clock virtual: sleeps complete instantly
    // but Instant arithmetic still reflects the slept duration.

    #[tokio::test(start_paused = true)]
    async fn stays_silent_under_the_ceiling() {
        let limiter = RateLimiter::new(3);
        let before = Instant::now();
        for _ in 0..3 {
            limiter.acquire().await;
        }
        assert_eq!(before.elapsed(), Duration::ZERO, "no sleep expected");
    }

    #[tokio::test(start_paused = true)]
    async fn sleeps_on_the_call_past_the_ceiling() {
        let limiter = RateLimiter::new(3);
        for _ in 0..3 {
            limiter.acquire().await;
        }
        let before = Instant::now();
        limiter.acquire().await;
        assert!(
            before.elapsed() >= Duration::from_secs(59),
            "4th call should sleep out the window, slept {:?}",
            before.elapsed()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn counter_resets_after_a_minute_of_quiet() {
        let limiter = RateLimiter::new(2);
        limiter.acquire().await;
        limiter.acquire().await;

        tokio::time::sleep(Duration::from_secs(61)).await;

        let before = Instant::now();
        limiter.acquire().await;
        assert_eq!(
            before.elapsed(),
            Duration::ZERO,
            "window should have reset without sleeping"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn next_window_fills_again_after_forced_sleep() {
        let limiter = RateLimiter::new(1);
        limiter.acquire().await;
        limiter.acquire().await; // sleeps out window 1, starts window 2
        let before = Instant::now();
        limiter.acquire().await; // window 2 full again, sleeps
        assert!(before.elapsed() >= Duration::from_secs(59));
    }
}
