//! Time utilities for geospatial-gate.
//!
//! Tick time is monotonic microseconds (u64) supplied by the driver.
//! Anchor creation times are device-local calendar timestamps.

use chrono::NaiveDateTime;

/// Microseconds per millisecond.
pub const MICROS_PER_MILLI: u64 = 1_000;

/// Convert a millisecond configuration value into tick microseconds.
pub fn millis_to_micros(ms: u64) -> u64 {
    ms.saturating_mul(MICROS_PER_MILLI)
}

/// Current device-local wall-clock time.
pub fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Whole calendar days between the date of `earlier` and the date of `later`.
///
/// Time of day is ignored: 23:59 on one day and 00:01 on the next are one day apart.
pub fn calendar_days_between(earlier: NaiveDateTime, later: NaiveDateTime) -> i64 {
    (later.date() - earlier.date()).num_days()
}
