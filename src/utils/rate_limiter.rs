//! Fixed-window request limiter keyed by client identity (usually the IP).
//!
//! State lives in this process only: it is lost on restart and not shared
//! between instances, so it deters abuse but guarantees nothing.

use crate::config::RateLimitConfig;
use crate::error::{AppError, AppResult};
use crate::utils::Clock;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: Instant,
}

#[derive(Clone)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    clock: Arc<dyn Clock>,
    windows: Arc<Mutex<HashMap<String, Window>>>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            max_requests: config.max_requests,
            window: Duration::from_secs(config.window_secs),
            clock,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Count one request for `key`, failing with `TooManyRequests` once the
    /// window's budget is spent.
    pub fn check(&self, key: &str) -> AppResult<()> {
        let now = self.clock.instant();
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);

        match windows.get_mut(key) {
            Some(w) if now < w.reset_at => {
                if w.count >= self.max_requests {
                    let wait_secs = w.reset_at.saturating_duration_since(now).as_secs().max(1);
                    log::warn!("Rate limit exceeded for {key}");
                    return Err(AppError::TooManyRequests(format!(
                        "Too many requests. Please try again in {wait_secs} seconds"
                    )));
                }
                w.count += 1;
            }
            _ => {
                windows.insert(
                    key.to_string(),
                    Window {
                        count: 1,
                        reset_at: now + self.window,
                    },
                );
            }
        }

        Ok(())
    }

    /// Drop windows that have already reset; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.instant();
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        let before = windows.len();
        windows.retain(|_, w| now < w.reset_at);
        before - windows.len()
    }

    pub fn tracked_keys(&self) -> usize {
        self.windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ManualClock;

    fn limiter(max_requests: u32, window_secs: u64) -> (RateLimiter, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let config = RateLimitConfig {
            max_requests,
            window_secs,
        };
        (RateLimiter::new(&config, clock.clone()), clock)
    }

    #[test]
    fn test_admits_up_to_limit_then_rejects() {
        let (limiter, _clock) = limiter(3, 60);
        for _ in 0..3 {
            assert!(limiter.check("10.0.0.1").is_ok());
        }
        let err = limiter.check("10.0.0.1").unwrap_err();
        assert!(matches!(err, AppError::TooManyRequests(_)));
    }

    #[test]
    fn test_keys_are_independent() {
        let (limiter, _clock) = limiter(1, 60);
        assert!(limiter.check("10.0.0.1").is_ok());
        assert!(limiter.check("10.0.0.2").is_ok());
        assert!(limiter.check("10.0.0.1").is_err());
    }

    #[test]
    fn test_window_resets_after_expiry() {
        let (limiter, clock) = limiter(2, 60);
        assert!(limiter.check("ip").is_ok());
        assert!(limiter.check("ip").is_ok());
        assert!(limiter.check("ip").is_err());

        clock.advance(Duration::from_secs(59));
        assert!(limiter.check("ip").is_err());

        clock.advance(Duration::from_secs(1));
        assert!(limiter.check("ip").is_ok());
        assert!(limiter.check("ip").is_ok());
        assert!(limiter.check("ip").is_err());
    }

    #[test]
    fn test_rejection_message_names_wait_time() {
        let (limiter, clock) = limiter(1, 900);
        limiter.check("ip").unwrap();
        clock.advance(Duration::from_secs(300));
        match limiter.check("ip") {
            Err(AppError::TooManyRequests(msg)) => assert!(msg.contains("600 seconds")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_purge_expired_drops_finished_windows() {
        let (limiter, clock) = limiter(5, 60);
        limiter.check("a").unwrap();
        clock.advance(Duration::from_secs(30));
        limiter.check("b").unwrap();
        assert_eq!(limiter.tracked_keys(), 2);

        clock.advance(Duration::from_secs(31));
        assert_eq!(limiter.purge_expired(), 1);
        assert_eq!(limiter.tracked_keys(), 1);
    }
}
