//! Conversion between wire timestamps and appointment-file ticks.
//!
//! The appointment file stores instants as a count of 100-nanosecond
//! intervals since 0001-01-01T00:00:00Z. The remote calendar speaks
//! RFC 3339 (or a bare `YYYY-MM-DD` for all-day events).

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::error::{ApptSyncError, ApptSyncResult};

/// Ticks between the tick epoch and the Unix epoch.
pub const UNIX_EPOCH_TICKS: i64 = 621_355_968_000_000_000;

const TICKS_PER_SECOND: i64 = 10_000_000;
const NANOS_PER_TICK: i64 = 100;

/// Offset-less layouts accepted on the wire, interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Convert a tick count to a UTC instant.
pub fn ticks_to_timestamp(ticks: i64) -> DateTime<Utc> {
    let since_unix = i128::from(ticks) - i128::from(UNIX_EPOCH_TICKS);
    let per_second = i128::from(TICKS_PER_SECOND);

    let secs = since_unix.div_euclid(per_second) as i64;
    let nanos = (since_unix.rem_euclid(per_second) * i128::from(NANOS_PER_TICK)) as u32;

    // Every i64 tick value lands within about 29,000 years of year 1,
    // far inside chrono's representable range.
    DateTime::from_timestamp(secs, nanos).unwrap_or_default()
}

/// Convert a UTC instant to a tick count (100 ns resolution).
pub fn datetime_to_ticks(dt: DateTime<Utc>) -> i64 {
    dt.timestamp()
        .saturating_mul(TICKS_PER_SECOND)
        .saturating_add(i64::from(dt.timestamp_subsec_nanos()) / NANOS_PER_TICK)
        .saturating_add(UNIX_EPOCH_TICKS)
}

/// Parse a wire timestamp into a UTC instant.
///
/// Accepts RFC 3339 with `Z` or a numeric offset, an offset-less date-time
/// (assumed UTC) and an all-day `YYYY-MM-DD` date (midnight UTC).
pub fn parse_timestamp(value: &str) -> ApptSyncResult<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }

    Err(ApptSyncError::TimestampParse(value.to_string()))
}

/// Convert a wire timestamp to a tick count.
pub fn timestamp_to_ticks(value: &str) -> ApptSyncResult<i64> {
    parse_timestamp(value).map(datetime_to_ticks)
}

/// Parse the tick text stored in the appointment file.
pub fn parse_ticks(text: &str) -> ApptSyncResult<DateTime<Utc>> {
    text.trim()
        .parse::<i64>()
        .map(ticks_to_timestamp)
        .map_err(|_| ApptSyncError::TimestampParse(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_unix_epoch_boundary() {
        assert_eq!(
            ticks_to_timestamp(UNIX_EPOCH_TICKS),
            Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(timestamp_to_ticks("1970-01-01T00:00:00Z").unwrap(), UNIX_EPOCH_TICKS);
    }

    #[test]
    fn test_known_appointment_tick() {
        assert_eq!(
            ticks_to_timestamp(637_776_648_000_000_000),
            Utc.with_ymd_and_hms(2022, 1, 13, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_whole_second_ticks_roundtrip() {
        for ticks in [
            637_776_648_000_000_000,
            UNIX_EPOCH_TICKS,
            638_500_000_000_000_000,
            0,
        ] {
            assert_eq!(datetime_to_ticks(ticks_to_timestamp(ticks)), ticks);
        }

        let dt = Utc.with_ymd_and_hms(2024, 1, 19, 15, 0, 0).unwrap();
        assert_eq!(ticks_to_timestamp(datetime_to_ticks(dt)), dt);
    }

    #[test]
    fn test_sub_second_precision_is_kept() {
        let ticks = 637_776_648_000_000_001;
        let dt = ticks_to_timestamp(ticks);
        assert_eq!(dt.timestamp_subsec_nanos(), 100);
        assert_eq!(datetime_to_ticks(dt), ticks);

        assert_eq!(
            timestamp_to_ticks("2022-01-13T10:00:00.5Z").unwrap(),
            637_776_648_005_000_000
        );
    }

    #[test]
    fn test_offsets_are_normalised_to_utc() {
        assert_eq!(
            timestamp_to_ticks("2024-01-19T16:00:00+01:00").unwrap(),
            timestamp_to_ticks("2024-01-19T15:00:00Z").unwrap()
        );
        assert_eq!(
            timestamp_to_ticks("2024-01-19T15:00:00").unwrap(),
            timestamp_to_ticks("2024-01-19T15:00:00+00:00").unwrap()
        );
    }

    #[test]
    fn test_all_day_date_is_midnight_utc() {
        assert_eq!(
            parse_timestamp("2024-01-20").unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 20, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_invalid_timestamp_is_rejected() {
        let err = timestamp_to_ticks("next tuesday").unwrap_err();
        assert!(matches!(err, ApptSyncError::TimestampParse(s) if s == "next tuesday"));
        assert!(parse_ticks("12x").is_err());
    }
}
