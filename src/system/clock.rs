//! Wall clock for the watchface

use chrono::{DateTime, Duration as ChronoDuration, NaiveDateTime, Timelike};
use embassy_time::{Duration, Instant};

/// Wake up this late after a minute boundary so the clock reads the new minute
const MINUTE_MARGIN: Duration = Duration::from_millis(5);

/// Known wall clock time at a known system time
pub struct TimeReference {
    /// Clock time (local)
    time: NaiveDateTime,
    /// Related system time
    instant: Instant,
}

impl TimeReference {
    /// Reference the given local time to the current system time
    pub fn from_datetime(time: NaiveDateTime) -> Self {
        Self {
            time,
            instant: Instant::now(),
        }
    }

    /// Reference a UNIX timestamp, shifted into local time
    pub fn from_timestamp(utc_secs: i64, offset_secs: i32) -> Self {
        let time = DateTime::from_timestamp(utc_secs + offset_secs as i64, 0)
            .map(|utc| utc.naive_utc())
            .unwrap_or_default();
        Self::from_datetime(time)
    }
}

pub struct Clock {
    reference: TimeReference,
}

impl Clock {
    /// Start the clock from a time reference
    pub fn new(reference: TimeReference) -> Self {
        Self { reference }
    }

    /// Current local time
    pub fn now(&self) -> NaiveDateTime {
        let elapsed = Instant::now().duration_since(self.reference.instant);
        self.reference.time + ChronoDuration::microseconds(elapsed.as_micros() as i64)
    }

    /// Replace the time reference
    pub fn set(&mut self, reference: TimeReference) {
        self.reference = reference;
    }

    /// System time shortly after the next wall clock minute starts
    pub fn next_minute(&self) -> Instant {
        let now = self.now();
        let into_minute =
            now.second() as u64 * 1_000_000 + (now.nanosecond() / 1_000) as u64 % 1_000_000;
        Instant::now() + Duration::from_micros(60_000_000 - into_minute) + MINUTE_MARGIN
    }
}
