//! Timestamp conversion and countdown arithmetic
//!
//! Unlock times are Unix epoch seconds. User input is a wall-clock date/time
//! with no zone attached; it is interpreted in the runtime's local timezone
//! at the moment of conversion.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Local, LocalResult, NaiveDateTime, TimeZone, Utc};

use crate::{UnixSeconds, ValidationError};

/// Shown in place of a countdown once the unlock time has passed
pub const UNLOCKED_NOW: &str = "Unlocked now";

/// Accepted wall-clock input formats (HTML datetime-local and friends)
const INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

const UNITS: [(i64, &str); 4] = [(86_400, "d"), (3_600, "h"), (60, "m"), (1, "s")];

/// Source of "now" in Unix seconds
pub trait Clock: Send + Sync {
    fn now(&self) -> UnixSeconds;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> UnixSeconds {
        Utc::now().timestamp()
    }
}

/// Manually driven clock, for tests and replays
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start: UnixSeconds) -> Self {
        Self {
            now: AtomicI64::new(start),
        }
    }

    pub fn set(&self, now: UnixSeconds) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> UnixSeconds {
        self.now.load(Ordering::SeqCst)
    }
}

/// Parse a wall-clock input string such as "2030-01-01T12:00"
pub fn parse_local_datetime(input: &str) -> Result<NaiveDateTime, ValidationError> {
    let trimmed = input.trim();
    INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| ValidationError::InvalidDateTime {
            value: input.to_string(),
        })
}

/// Convert a local wall-clock date/time to Unix seconds using the runtime's
/// current local timezone.
pub fn to_unix_seconds(local: NaiveDateTime) -> Result<UnixSeconds, ValidationError> {
    to_unix_seconds_in(local, &Local)
}

/// Convert a wall-clock date/time in `tz` to Unix seconds, flooring any
/// sub-second part.
pub fn to_unix_seconds_in<Tz: TimeZone>(
    local: NaiveDateTime,
    tz: &Tz,
) -> Result<UnixSeconds, ValidationError> {
    let resolved = resolve_local(tz.from_local_datetime(&local), &local)?;
    // timestamp() floors: subsecond nanos are always non-negative
    Ok(resolved.timestamp())
}

/// Ambiguous times take the earlier instant; times inside a DST gap are rejected.
fn resolve_local<Tz: TimeZone>(
    result: LocalResult<DateTime<Tz>>,
    local: &NaiveDateTime,
) -> Result<DateTime<Tz>, ValidationError> {
    match result {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        LocalResult::None => Err(ValidationError::NonexistentLocalTime {
            value: local.to_string(),
        }),
    }
}

/// Unix seconds to a local date/time
pub fn from_unix_seconds(secs: UnixSeconds) -> Option<DateTime<Local>> {
    from_unix_seconds_in(secs, &Local)
}

pub fn from_unix_seconds_in<Tz: TimeZone>(secs: UnixSeconds, tz: &Tz) -> Option<DateTime<Tz>> {
    tz.timestamp_opt(secs, 0).single()
}

/// Human readable unlock date in the local timezone
pub fn format_unlock_date(secs: UnixSeconds) -> String {
    format_unlock_date_in(secs, &Local)
}

pub fn format_unlock_date_in<Tz: TimeZone>(secs: UnixSeconds, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match from_unix_seconds_in(secs, tz) {
        Some(dt) => dt.format("%b %-d, %Y %H:%M:%S").to_string(),
        None => format!("@{}", secs),
    }
}

/// Seconds until unlock; zero or negative once the unlock time has passed
pub fn remaining(unlock_time: UnixSeconds, now: UnixSeconds) -> i64 {
    unlock_time.saturating_sub(now)
}

/// Compact countdown: the largest two non-zero units, e.g. "1d 2h", "5m 3s".
pub fn format_remaining(remaining: i64) -> String {
    if remaining <= 0 {
        return UNLOCKED_NOW.to_string();
    }

    let mut rest = remaining;
    let mut parts = Vec::with_capacity(2);
    for (unit_secs, suffix) in UNITS {
        let value = rest / unit_secs;
        rest %= unit_secs;
        if value > 0 {
            parts.push(format!("{}{}", value, suffix));
            if parts.len() == 2 {
                break;
            }
        }
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate};

    fn naive(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_to_unix_seconds_utc() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let secs = to_unix_seconds_in(naive(2030, 1, 1, 0, 0, 0), &utc).unwrap();
        assert_eq!(secs, 1_893_456_000);
    }

    #[test]
    fn test_to_unix_seconds_applies_offset() {
        // UTC+2: local midnight is 22:00 UTC the previous day
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let secs = to_unix_seconds_in(naive(2030, 1, 1, 0, 0, 0), &plus_two).unwrap();
        assert_eq!(secs, 1_893_456_000 - 7_200);
    }

    #[test]
    fn test_to_unix_seconds_floors_millis() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let with_millis = NaiveDate::from_ymd_opt(2030, 1, 1)
            .unwrap()
            .and_hms_milli_opt(0, 0, 0, 999)
            .unwrap();
        assert_eq!(to_unix_seconds_in(with_millis, &utc).unwrap(), 1_893_456_000);

        let before_epoch = NaiveDate::from_ymd_opt(1969, 12, 31)
            .unwrap()
            .and_hms_milli_opt(23, 59, 59, 500)
            .unwrap();
        assert_eq!(to_unix_seconds_in(before_epoch, &utc).unwrap(), -1);
    }

    #[test]
    fn test_round_trip_within_one_second() {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let original = NaiveDate::from_ymd_opt(2031, 7, 14)
            .unwrap()
            .and_hms_milli_opt(9, 30, 15, 750)
            .unwrap();
        let secs = to_unix_seconds_in(original, &tz).unwrap();
        let back = from_unix_seconds_in(secs, &tz).unwrap().naive_local();
        let diff = (original - back).num_milliseconds().abs();
        assert!(diff < 1000, "round trip drifted by {}ms", diff);
    }

    #[test]
    fn test_resolve_local_dst_edges() {
        let tz = FixedOffset::east_opt(3600).unwrap();
        let local = naive(2030, 10, 27, 2, 30, 0);
        let early = tz.from_local_datetime(&local).unwrap();
        let late = early + chrono::Duration::hours(1);

        let picked = resolve_local(LocalResult::Ambiguous(early, late), &local).unwrap();
        assert_eq!(picked, early);

        let err = resolve_local::<FixedOffset>(LocalResult::None, &local).unwrap_err();
        assert!(matches!(err, ValidationError::NonexistentLocalTime { .. }));
    }

    #[test]
    fn test_parse_local_datetime() {
        assert_eq!(
            parse_local_datetime("2030-01-01T12:34").unwrap(),
            naive(2030, 1, 1, 12, 34, 0)
        );
        assert_eq!(
            parse_local_datetime(" 2030-01-01 12:34:56 ").unwrap(),
            naive(2030, 1, 1, 12, 34, 56)
        );
        assert!(matches!(
            parse_local_datetime(""),
            Err(ValidationError::InvalidDateTime { .. })
        ));
        assert!(parse_local_datetime("next tuesday").is_err());
    }

    #[test]
    fn test_format_unlock_date() {
        let utc = FixedOffset::east_opt(0).unwrap();
        assert_eq!(
            format_unlock_date_in(1_893_456_000, &utc),
            "Jan 1, 2030 00:00:00"
        );
    }

    #[test]
    fn test_remaining() {
        assert_eq!(remaining(1_000, 400), 600);
        assert_eq!(remaining(1_000, 1_000), 0);
        assert_eq!(remaining(1_000, 1_010), -10);
    }

    #[test]
    fn test_format_remaining_two_largest_units() {
        let d1h2m3s4 = 86_400 + 2 * 3_600 + 3 * 60 + 4;
        assert_eq!(format_remaining(d1h2m3s4), "1d 2h");
        // zero hours are skipped, not rendered
        assert_eq!(format_remaining(86_400 + 5 * 60 + 3), "1d 5m");
        assert_eq!(format_remaining(3 * 3_600 + 7), "3h 7s");
        assert_eq!(format_remaining(5 * 60 + 3), "5m 3s");
        assert_eq!(format_remaining(3_600), "1h");
        assert_eq!(format_remaining(42), "42s");
    }

    #[test]
    fn test_format_remaining_sentinel() {
        assert_eq!(format_remaining(0), UNLOCKED_NOW);
        assert_eq!(format_remaining(-30), UNLOCKED_NOW);
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(100);
        assert_eq!(clock.now(), 100);
        clock.advance(5);
        assert_eq!(clock.now(), 105);
        clock.set(7);
        assert_eq!(clock.now(), 7);
    }
}
