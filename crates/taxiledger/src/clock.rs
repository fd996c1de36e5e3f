//! Time source abstraction.
//!
//! License arithmetic is done on millisecond timestamps taken from a [`Clock`]
//! so that trial and expiry behaviour can be tested at exact instants.

use std::cell::Cell;

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::error::{Error, Result};

/// Source of the current time.
pub trait Clock {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a chosen instant that only moves when told to.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Cell<DateTime<Utc>>,
}

impl FixedClock {
    /// Freeze the clock at `now`.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    /// Freeze the clock at a millisecond Unix timestamp.
    ///
    /// Out-of-range values fall back to the Unix epoch.
    #[must_use]
    pub fn at_millis(millis: i64) -> Self {
        Self::new(from_millis(millis))
    }

    /// Move the clock forward (or backward, for negative durations).
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// Convert a millisecond Unix timestamp into a UTC instant.
///
/// Out-of-range values fall back to the Unix epoch.
#[must_use]
pub fn from_millis(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// `from + by`, refusing instants past the end of the calendar.
///
/// # Errors
///
/// Returns [`Error::ExpiryOutOfRange`] if the sum is not representable.
pub fn checked_add(from: DateTime<Utc>, by: Duration) -> Result<DateTime<Utc>> {
    from.checked_add_signed(by)
        .ok_or(Error::ExpiryOutOfRange {
            from,
            days: by.num_days(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_is_frozen() {
        let clock = FixedClock::at_millis(1_700_000_000_000);
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now().timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_fixed_clock_advance() {
        let clock = FixedClock::at_millis(0);
        clock.advance(Duration::days(2));
        assert_eq!(clock.now().timestamp_millis(), 2 * 86_400_000);

        clock.advance(Duration::days(-1));
        assert_eq!(clock.now().timestamp_millis(), 86_400_000);
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn test_checked_add() {
        let start = from_millis(0);
        assert_eq!(
            checked_add(start, Duration::days(1)).unwrap().timestamp_millis(),
            86_400_000
        );

        let err = checked_add(DateTime::<Utc>::MAX_UTC, Duration::days(1)).unwrap_err();
        assert!(matches!(err, Error::ExpiryOutOfRange { days: 1, .. }));
    }

    #[test]
    fn test_from_millis_out_of_range() {
        assert_eq!(from_millis(i64::MAX), DateTime::UNIX_EPOCH);
    }
}
