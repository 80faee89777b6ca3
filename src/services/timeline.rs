//! Clock and calendar arithmetic
//!
//! The engine does all of its math on whole minutes. These helpers convert
//! between "HH:MM" strings, minute counts and chrono values, and advance a
//! (date, time) pair across day boundaries.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Parse an "HH:MM" clock string into minutes since midnight.
pub fn parse_time(s: &str) -> Option<i64> {
    let (hours, minutes) = s.split_once(':')?;
    let hours: i64 = hours.parse().ok()?;
    let minutes: i64 = minutes.parse().ok()?;
    if !(0..24).contains(&hours) || !(0..60).contains(&minutes) {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Format a minute count as "HH:MM", wrapping past midnight.
///
/// Negative counts wrap backwards, so -30 renders as "23:30".
pub fn format_time(minutes: i64) -> String {
    let wrapped = minutes.rem_euclid(24 * 60);
    format!("{:02}:{:02}", wrapped / 60, wrapped % 60)
}

/// Minutes since midnight for a clock time.
pub fn time_to_minutes(time: NaiveTime) -> i64 {
    time.hour() as i64 * 60 + time.minute() as i64
}

/// Clock time for a minute count, wrapping past midnight.
pub fn minutes_to_time(minutes: i64) -> NaiveTime {
    let wrapped = minutes.rem_euclid(24 * 60) as u32;
    NaiveTime::from_hms_opt(wrapped / 60, wrapped % 60, 0).expect("wrapped minute of day")
}

/// Advance a (date, time) pair by whole minutes. Crossing midnight rolls
/// the calendar date forward, including month and year boundaries.
pub fn advance(date: NaiveDate, time: NaiveTime, minutes: i64) -> (NaiveDate, NaiveTime) {
    let shifted = NaiveDateTime::new(date, time) + Duration::minutes(minutes);
    (shifted.date(), shifted.time())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(hours: u32, minutes: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hours, minutes, 0).unwrap()
    }

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    // ------------------------------------------------------------------
    // 1. Parsing and formatting
    // ------------------------------------------------------------------

    #[test]
    fn test_parse_time_valid() {
        assert_eq!(parse_time("08:30"), Some(510));
        assert_eq!(parse_time("00:00"), Some(0));
        assert_eq!(parse_time("23:59"), Some(1439));
        // Single-digit hours are accepted
        assert_eq!(parse_time("8:05"), Some(485));
    }

    #[test]
    fn test_parse_time_invalid() {
        assert_eq!(parse_time("24:00"), None);
        assert_eq!(parse_time("12:60"), None);
        assert_eq!(parse_time("0830"), None);
        assert_eq!(parse_time("ab:cd"), None);
        assert_eq!(parse_time(""), None);
    }

    #[test]
    fn test_format_time_pads_and_wraps() {
        assert_eq!(format_time(65), "01:05");
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(1439), "23:59");
        // Past midnight
        assert_eq!(format_time(1500), "01:00");
        // Negative wraps backwards
        assert_eq!(format_time(-30), "23:30");
    }

    // ------------------------------------------------------------------
    // 2. Clock/minute conversions
    // ------------------------------------------------------------------

    #[test]
    fn test_time_minute_round_trip() {
        assert_eq!(time_to_minutes(hm(14, 45)), 885);
        assert_eq!(minutes_to_time(885), hm(14, 45));
        assert_eq!(minutes_to_time(1500), hm(1, 0));
    }

    // ------------------------------------------------------------------
    // 3. Calendar advancement
    // ------------------------------------------------------------------

    #[test]
    fn test_advance_same_day() {
        let (date, time) = advance(ymd(2025, 3, 10), hm(8, 0), 95);
        assert_eq!(date, ymd(2025, 3, 10));
        assert_eq!(time, hm(9, 35));
    }

    #[test]
    fn test_advance_crosses_midnight() {
        let (date, time) = advance(ymd(2025, 3, 10), hm(23, 30), 45);
        assert_eq!(date, ymd(2025, 3, 11));
        assert_eq!(time, hm(0, 15));
    }

    #[test]
    fn test_advance_crosses_month_and_year() {
        let (date, _) = advance(ymd(2025, 1, 31), hm(23, 0), 120);
        assert_eq!(date, ymd(2025, 2, 1));

        let (date, time) = advance(ymd(2025, 12, 31), hm(23, 50), 20);
        assert_eq!(date, ymd(2026, 1, 1));
        assert_eq!(time, hm(0, 10));
    }

    #[test]
    fn test_advance_leap_day() {
        let (date, _) = advance(ymd(2024, 2, 28), hm(23, 50), 30);
        assert_eq!(date, ymd(2024, 2, 29));
    }

    #[test]
    fn test_advance_multiple_days() {
        let (date, time) = advance(ymd(2025, 3, 10), hm(6, 0), 2 * 24 * 60 + 30);
        assert_eq!(date, ymd(2025, 3, 12));
        assert_eq!(time, hm(6, 30));
    }
}
