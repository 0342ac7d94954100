//! Injected time source.
//!
//! Systems never read the platform clock directly. Time-of-day decisions
//! (the bedroom sleep window, home operating hours) go through a [`Clock`]
//! so simulations are deterministic under test.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use time::{Duration, OffsetDateTime};

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

/// Wall clock in the local offset, falling back to UTC when the offset cannot
/// be determined (e.g. in a multi-threaded process on some platforms).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
    }
}

/// Clock that only moves when told to.
///
/// # Example
///
/// ```
/// use airsim_core::{Clock, ManualClock};
/// use time::{Duration, macros::datetime};
///
/// let clock = ManualClock::new(datetime!(2024-03-01 21:30 UTC));
/// clock.advance(Duration::minutes(45));
/// assert_eq!(clock.now(), datetime!(2024-03-01 22:15 UTC));
/// ```
pub struct ManualClock {
    now: Mutex<OffsetDateTime>,
}

impl ManualClock {
    pub fn new(start: OffsetDateTime) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Jump to an absolute instant.
    pub fn set(&self, instant: OffsetDateTime) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = instant;
    }

    /// Move forward (or backward, for negative durations).
    ///
    /// Returns false, leaving the clock where it was, when the result would
    /// fall outside the representable date range.
    pub fn advance(&self, by: Duration) -> bool {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        match now.checked_add(by) {
            Some(next) => {
                *now = next;
                true
            }
            None => false,
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> OffsetDateTime {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ManualClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualClock")
            .field("now", &self.now())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_manual_clock_set_and_advance() {
        let clock = ManualClock::new(datetime!(2024-01-01 23:50 UTC));
        clock.advance(Duration::minutes(20));
        assert_eq!(clock.now(), datetime!(2024-01-02 00:10 UTC));
        clock.set(datetime!(2024-06-01 12:00 UTC));
        assert_eq!(clock.now(), datetime!(2024-06-01 12:00 UTC));
    }

    #[test]
    fn test_manual_clock_refuses_to_overflow() {
        let start = datetime!(9999-12-31 23:00 UTC);
        let clock = ManualClock::new(start);
        assert!(!clock.advance(Duration::hours(2)));
        assert_eq!(clock.now(), start);
        assert!(!clock.advance(Duration::MAX));
        assert!(clock.advance(Duration::minutes(59)));
        assert_eq!(clock.now(), datetime!(9999-12-31 23:59 UTC));
    }

    #[test]
    fn test_system_clock_is_recent() {
        let now = SystemClock.now();
        assert!(now.year() >= 2024);
    }
}
