use chrono::{DateTime, Utc};
use std::time::Instant;

/// Time source. Wall-clock time drives record expiry, monotonic time drives
/// in-process windows such as the rate limiter.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
    fn instant(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }
}

#[cfg(test)]
pub use manual::ManualClock;

#[cfg(test)]
mod manual {
    use super::Clock;
    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    /// Clock that only moves when told to.
    pub struct ManualClock {
        state: Mutex<(DateTime<Utc>, Instant)>,
    }

    impl ManualClock {
        pub fn new() -> Self {
            let start = Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap();
            Self {
                state: Mutex::new((start, Instant::now())),
            }
        }

        pub fn advance(&self, by: Duration) {
            let mut state = self.state.lock().unwrap();
            state.0 += chrono::Duration::from_std(by).unwrap();
            state.1 += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            self.state.lock().unwrap().0
        }

        fn instant(&self) -> Instant {
            self.state.lock().unwrap().1
        }
    }
}
