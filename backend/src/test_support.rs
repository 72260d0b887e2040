//! Helpers shared by unit tests in `src/` and the behaviour suites in
//! `tests/`.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;

/// Clock that reports a settable instant.
///
/// # Examples
/// ```
/// use chrono::Duration;
/// use lending_backend::test_support::FixedClock;
/// use mockable::Clock;
///
/// let clock = FixedClock::at_fixture_time();
/// let before = clock.utc();
/// clock.advance(Duration::minutes(5));
/// assert_eq!(clock.utc() - before, Duration::minutes(5));
/// ```
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl FixedClock {
    /// Start at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    /// Start at 2025-06-01T09:00:00Z.
    pub fn at_fixture_time() -> Self {
        Self::new(fixture_timestamp())
    }

    /// Move the clock forward by `step`.
    pub fn advance(&self, step: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += step;
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The instant [`FixedClock::at_fixture_time`] starts from.
pub fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}
