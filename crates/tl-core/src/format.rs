//! Display helpers for durations, times and dates.

use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};

use crate::types::ValidationError;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Formats milliseconds as decimal hours with three places, e.g. `0.333`.
///
/// Milliseconds are truncated to whole seconds first. Negative durations render as `0.000`.
#[expect(clippy::cast_precision_loss, reason = "durations are far below 2^52 seconds")]
pub fn format_hours(ms: i64) -> String {
    if ms < 0 {
        return "0.000".to_string();
    }
    let hours = (ms / 1000) as f64 / 3600.0;
    format!("{hours:.3}")
}

/// Parses decimal hours (`"1.5"`) into milliseconds.
#[expect(
    clippy::cast_possible_truncation,
    reason = "value is checked to be finite and non-negative"
)]
pub fn parse_hours(s: &str) -> Result<i64, ValidationError> {
    let invalid = || ValidationError::InvalidDuration {
        value: s.to_string(),
    };
    let hours: f64 = s.trim().parse().map_err(|_| invalid())?;
    if !hours.is_finite() || hours < 0.0 {
        return Err(invalid());
    }
    Ok((hours * MS_PER_HOUR).round() as i64)
}

/// Formats a timestamp as a short local clock time, e.g. `10:20 AM`.
pub fn format_time(timestamp: DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format("%-I:%M %p").to_string()
}

/// Formats a date relative to `today`.
///
/// - the same day: `Today`
/// - the same ISO week: weekday name (`Wednesday`)
/// - the same year: `Mon, Jan 5`
/// - otherwise: `Mon, Jan 5, 2024`
pub fn format_date(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Today".to_string()
    } else if date.iso_week() == today.iso_week() {
        date.format("%A").to_string()
    } else if date.year() == today.year() {
        date.format("%a, %b %-d").to_string()
    } else {
        date.format("%a, %b %-d, %Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn format_hours_uses_three_decimals() {
        assert_eq!(format_hours(0), "0.000");
        assert_eq!(format_hours(20 * 60_000), "0.333");
        assert_eq!(format_hours(40 * 60_000), "0.667");
        assert_eq!(format_hours(3_600_000), "1.000");
        assert_eq!(format_hours(90 * 60_000), "1.500");
    }

    #[test]
    fn format_hours_truncates_to_seconds() {
        assert_eq!(format_hours(1_999), format_hours(1_000));
    }

    #[test]
    fn format_hours_negative_is_zero() {
        assert_eq!(format_hours(-5_000), "0.000");
    }

    #[test]
    fn parse_hours_accepts_decimal() {
        assert_eq!(parse_hours("1.5").unwrap(), 5_400_000);
        assert_eq!(parse_hours(" 0.25 ").unwrap(), 900_000);
        assert!(parse_hours("-1").is_err());
        assert!(parse_hours("soon").is_err());
        assert!(parse_hours("NaN").is_err());
    }

    #[test]
    fn format_date_relative_to_today() {
        let today = date(2026, 10, 21);
        assert_eq!(format_date(today, today), "Today");
        assert_eq!(format_date(date(2026, 10, 19), today), "Monday");
        assert_eq!(format_date(date(2026, 10, 18), today), "Sun, Oct 18");
        assert_eq!(format_date(date(2024, 1, 5), today), "Fri, Jan 5, 2024");
    }
}
