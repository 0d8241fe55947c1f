//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone, Utc};
use regex::Regex;

use tl_db::Database;

use crate::Config;

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\s+(minute|hour|day|week)s?\s+ago$").expect("relative time regex is valid")
});

/// Conservative bounds for relative time parsing (~1000 years in minutes).
const MAX_RELATIVE_MINUTES: i64 = 1000 * 365 * 24 * 60;

/// Local wall-clock formats accepted in addition to RFC 3339.
const LOCAL_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S"];

/// Opens the configured database, creating its directory if needed, and applies
/// the configured noise threshold.
pub fn open_database(config: &Config) -> Result<Database> {
    let noise_threshold = Duration::try_seconds(config.noise_threshold_secs).with_context(|| {
        format!("noise_threshold_secs out of range: {}", config.noise_threshold_secs)
    })?;
    if let Some(parent) = config.database_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }
    let mut db = Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;
    db.set_noise_threshold(noise_threshold);
    Ok(db)
}

/// Parse a datetime string as RFC 3339, local wall-clock time, or relative time.
///
/// Supports:
/// - RFC 3339: "2026-01-15T10:30:00Z"
/// - Local: "2026-01-15 10:30"
/// - Relative: "2 hours ago", "30 minutes ago", "1 day ago", "1 week ago"
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    parse_datetime_at(s, Utc::now())
}

pub fn parse_datetime_at(s: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in LOCAL_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            let Some(local) = Local.from_local_datetime(&naive).earliest() else {
                bail!("{s} does not exist in the local time zone");
            };
            return Ok(local.with_timezone(&Utc));
        }
    }

    let Some(caps) = RELATIVE_TIME_RE.captures(s) else {
        bail!(
            "Invalid datetime: {s}. Use RFC 3339 (e.g., 2026-01-15T10:30:00Z), local time (e.g., '2026-01-15 10:30') or relative (e.g., '2 hours ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative time")?;

    let (max_for_unit, minutes_per_unit) = match &caps[2] {
        "minute" => (MAX_RELATIVE_MINUTES, 1),
        "hour" => (MAX_RELATIVE_MINUTES / 60, 60),
        "day" => (MAX_RELATIVE_MINUTES / (60 * 24), 60 * 24),
        "week" => (MAX_RELATIVE_MINUTES / (60 * 24 * 7), 60 * 24 * 7),
        unit => bail!("Unknown time unit: {unit}"),
    };

    if n > max_for_unit {
        bail!("Relative time value too large: {n} {}", &caps[2]);
    }

    Ok(now - Duration::minutes(n * minutes_per_unit))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 21, 12, 0, 0).unwrap()
    }

    #[test]
    fn parses_rfc3339() {
        let parsed = parse_datetime_at("2026-10-21T10:20:00Z", now()).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 10, 21, 10, 20, 0).unwrap());

        let offset = parse_datetime_at("2026-10-21T12:20:00+02:00", now()).unwrap();
        assert_eq!(offset, parsed);
    }

    #[test]
    fn parses_local_wall_clock() {
        let parsed = parse_datetime_at("2026-10-21 10:20", now()).unwrap();
        let local = parsed.with_timezone(&Local);
        assert_eq!(local.format("%Y-%m-%d %H:%M").to_string(), "2026-10-21 10:20");
    }

    #[test]
    fn parses_relative_units() {
        assert_eq!(
            parse_datetime_at("30 minutes ago", now()).unwrap(),
            now() - Duration::minutes(30)
        );
        assert_eq!(
            parse_datetime_at("1 hour ago", now()).unwrap(),
            now() - Duration::hours(1)
        );
        assert_eq!(
            parse_datetime_at("2 weeks ago", now()).unwrap(),
            now() - Duration::weeks(2)
        );
    }

    #[test]
    fn rejects_garbage_and_huge_values() {
        let err = parse_datetime_at("tomorrow", now()).unwrap_err();
        assert!(err.to_string().contains("Invalid datetime"));

        let err = parse_datetime_at("999999999 weeks ago", now()).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn open_database_applies_noise_threshold() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config {
            database_path: temp.path().join("nested/tl.db"),
            noise_threshold_secs: 120,
            ..Config::default()
        };
        let db = open_database(&config).unwrap();
        assert_eq!(db.noise_threshold(), Duration::minutes(2));
    }

    #[test]
    fn open_database_rejects_oversized_noise_threshold() {
        let temp = tempfile::tempdir().unwrap();
        for secs in [i64::MAX, i64::MIN] {
            let config = Config {
                database_path: temp.path().join("tl.db"),
                noise_threshold_secs: secs,
                ..Config::default()
            };
            let err = open_database(&config).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("noise_threshold_secs out of range: {secs}")
            );
        }
        assert!(!temp.path().join("tl.db").exists());
    }
}
