//! Guide timestamps and clock formatting.
//!
//! The user's timezone is a fixed hour offset added to every instant before
//! UTC fields are read back out. There is no zone database and no DST; the
//! offset stands in for both.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

pub const MINUTE_MS: i64 = 60_000;
pub const HOUR_MS: i64 = 60 * MINUTE_MS;
pub const HALF_HOUR_MS: i64 = 30 * MINUTE_MS;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Current wall-clock instant in epoch milliseconds
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Offset in hours as milliseconds
pub fn offset_ms(offset_hours: i32) -> i64 {
    offset_hours as i64 * HOUR_MS
}

/// Current instant shifted by the configured offset.
/// Every "now" compared against programme intervals comes from here.
pub fn now_adjusted(offset_hours: i32) -> i64 {
    now_ms() + offset_ms(offset_hours)
}

/// Parse an XMLTV compact timestamp (`YYYYMMDDHHmm[ss] [+TZ]`).
///
/// Only the first 12 characters are read, as UTC calendar fields; seconds
/// and the zone suffix are ignored. Anything shorter or unparseable yields
/// the current instant.
pub fn parse_compact_timestamp(s: Option<&str>) -> i64 {
    parse_compact_timestamp_or(s, now_ms)
}

pub(crate) fn parse_compact_timestamp_or(s: Option<&str>, fallback: impl FnOnce() -> i64) -> i64 {
    s.and_then(|s| s.get(..12))
        .and_then(compact_fields)
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or_else(fallback)
}

fn compact_fields(head: &str) -> Option<NaiveDateTime> {
    if !head.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let field = |range: std::ops::Range<usize>| head[range].parse::<u32>().ok();
    let date = NaiveDate::from_ymd_opt(field(0..4)? as i32, field(4..6)?, field(6..8)?)?;
    date.and_hms_opt(field(8..10)?, field(10..12)?, 0)
}

fn shifted(instant: i64, offset_hours: i32) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(instant + offset_ms(offset_hours))
}

/// 24-hour `HH:MM` of `instant` after applying the offset
pub fn format_clock_time(instant: i64, offset_hours: i32) -> String {
    match shifted(instant, offset_hours) {
        Some(dt) => dt.format("%H:%M").to_string(),
        None => "--:--".to_string(),
    }
}

/// `DD Mon` of `instant` after applying the offset
pub fn format_clock_date(instant: i64, offset_hours: i32) -> String {
    match shifted(instant, offset_hours) {
        Some(dt) => format!("{:02} {}", dt.day(), MONTHS[dt.month0() as usize]),
        None => String::new(),
    }
}

/// `HH:MM - HH:MM` range label used on programme cards
pub fn format_time_range(start: i64, end: i64, offset_hours: i32) -> String {
    format!(
        "{} - {}",
        format_clock_time(start, offset_hours),
        format_clock_time(end, offset_hours)
    )
}

/// Floor an instant to its half-hour boundary
pub fn snap_to_half_hour(instant: i64) -> i64 {
    instant.div_euclid(HALF_HOUR_MS) * HALF_HOUR_MS
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn epoch(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> i64 {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap().timestamp_millis()
    }

    #[test]
    fn test_parse_compact_timestamp() {
        assert_eq!(parse_compact_timestamp(Some("202401010800")), epoch(2024, 1, 1, 8, 0));
        // Seconds and zone suffix are ignored
        assert_eq!(
            parse_compact_timestamp(Some("20240101080059 +0200")),
            epoch(2024, 1, 1, 8, 0)
        );
    }

    #[test]
    fn test_parse_fails_closed() {
        assert_eq!(parse_compact_timestamp_or(None, || 42), 42);
        assert_eq!(parse_compact_timestamp_or(Some("20240101"), || 42), 42);
        assert_eq!(parse_compact_timestamp_or(Some("2024AB010800"), || 42), 42);
        assert_eq!(parse_compact_timestamp_or(Some("202413010800"), || 42), 42);

        let before = now_ms();
        let ts = parse_compact_timestamp(Some("short"));
        assert!(ts >= before && ts <= now_ms());
    }

    #[test]
    fn test_format_clock_crosses_midnight() {
        let t = epoch(2024, 1, 1, 23, 30);
        assert_eq!(format_clock_time(t, 2), "01:30");
        assert_eq!(format_clock_date(t, 2), "02 Jan");
        assert_eq!(format_clock_time(t, 0), "23:30");
        assert_eq!(format_clock_date(t, 0), "01 Jan");
    }

    #[test]
    fn test_negative_offset() {
        let t = epoch(2024, 3, 1, 2, 15);
        assert_eq!(format_clock_time(t, -5), "21:15");
        assert_eq!(format_clock_date(t, -5), "29 Feb");
    }

    #[test]
    fn test_time_range() {
        let s = epoch(2024, 1, 1, 8, 0);
        assert_eq!(format_time_range(s, s + 30 * MINUTE_MS, 1), "09:00 - 09:30");
    }

    #[test]
    fn test_snap_to_half_hour() {
        let t = epoch(2024, 1, 1, 8, 44);
        assert_eq!(snap_to_half_hour(t), epoch(2024, 1, 1, 8, 30));
        assert_eq!(snap_to_half_hour(epoch(2024, 1, 1, 9, 0)), epoch(2024, 1, 1, 9, 0));
    }

    #[test]
    fn test_now_adjusted_shifts_by_offset() {
        let plain = now_adjusted(0);
        let shifted = now_adjusted(3);
        let delta = shifted - plain;
        assert!(delta >= 3 * HOUR_MS && delta < 3 * HOUR_MS + 1_000);
    }
}
