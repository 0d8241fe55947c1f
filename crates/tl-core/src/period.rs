//! Date ranges used to aggregate task durations.
//!
//! Every period resolves to a half-open `[start, end)` interval in UTC whose
//! boundaries fall on local midnights. Weeks start on Monday.

use chrono::{DateTime, Datelike, Duration, Local, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};

/// A named span of days to report on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Today,
    Yesterday,
    ThisWeek,
    LastWeek,
    AllTime,
    /// A single calendar day.
    Day(NaiveDate),
    /// An inclusive run of calendar days.
    Days { first: NaiveDate, last: NaiveDate },
}

/// Converts a local date at midnight to UTC.
/// Handles DST ambiguity by picking the earlier time.
pub fn local_midnight_to_utc(local_date: NaiveDate) -> DateTime<Utc> {
    let midnight = local_date.and_time(NaiveTime::MIN);
    match Local.from_local_datetime(&midnight) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => {
            // DST spring-forward gap at midnight; 1am always exists
            let one_am = midnight + Duration::hours(1);
            Local
                .from_local_datetime(&one_am)
                .earliest()
                .map_or_else(|| Utc.from_utc_datetime(&midnight), |dt| dt.with_timezone(&Utc))
        }
    }
}

/// Returns the Monday of the week containing `date`.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    let days_since_monday = date.weekday().num_days_from_monday();
    date - Duration::days(i64::from(days_since_monday))
}

impl Period {
    /// The first and last calendar day covered, or `None` for [`Period::AllTime`].
    pub fn days(self, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        match self {
            Self::Today => Some((today, today)),
            Self::Yesterday => {
                let yesterday = today - Duration::days(1);
                Some((yesterday, yesterday))
            }
            Self::ThisWeek => {
                let monday = start_of_week(today);
                Some((monday, monday + Duration::days(6)))
            }
            Self::LastWeek => {
                let monday = start_of_week(today) - Duration::days(7);
                Some((monday, monday + Duration::days(6)))
            }
            Self::AllTime => None,
            Self::Day(day) => Some((day, day)),
            Self::Days { first, last } if last < first => Some((last, first)),
            Self::Days { first, last } => Some((first, last)),
        }
    }

    /// UTC boundaries as a half-open interval, or `None` for all time.
    pub fn bounds(self, today: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let (first, last) = self.days(today)?;
        let start = local_midnight_to_utc(first);
        let end = local_midnight_to_utc(last + Duration::days(1));
        Some((start, end))
    }

    /// Human-readable label, e.g. `This week` or `Mon, Jan 5 - Fri, Jan 9`.
    pub fn label(self, today: NaiveDate) -> String {
        match self {
            Self::Today => "Today".to_string(),
            Self::Yesterday => "Yesterday".to_string(),
            Self::ThisWeek => "This week".to_string(),
            Self::LastWeek => "Last week".to_string(),
            Self::AllTime => "All time".to_string(),
            Self::Day(day) => crate::format::format_date(day, today),
            Self::Days { .. } => match self.days(today) {
                Some((first, last)) if first == last => crate::format::format_date(first, today),
                Some((first, last)) => format!(
                    "{} - {}",
                    crate::format::format_date(first, today),
                    crate::format::format_date(last, today)
                ),
                None => "All time".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn start_of_week_is_monday() {
        // 2026-10-21 is a Wednesday
        assert_eq!(start_of_week(date(2026, 10, 21)), date(2026, 10, 19));
        assert_eq!(start_of_week(date(2026, 10, 19)), date(2026, 10, 19));
        assert_eq!(start_of_week(date(2026, 10, 25)), date(2026, 10, 19));
    }

    #[test]
    fn week_periods_cover_seven_days() {
        let today = date(2026, 10, 21);
        assert_eq!(
            Period::ThisWeek.days(today),
            Some((date(2026, 10, 19), date(2026, 10, 25)))
        );
        assert_eq!(
            Period::LastWeek.days(today),
            Some((date(2026, 10, 12), date(2026, 10, 18)))
        );
    }

    #[test]
    fn day_periods() {
        let today = date(2026, 1, 1);
        assert_eq!(Period::Today.days(today), Some((today, today)));
        assert_eq!(
            Period::Yesterday.days(today),
            Some((date(2025, 12, 31), date(2025, 12, 31)))
        );
        assert_eq!(Period::AllTime.days(today), None);
        assert_eq!(Period::AllTime.bounds(today), None);
    }

    #[test]
    fn reversed_days_are_normalized() {
        let period = Period::Days {
            first: date(2026, 3, 10),
            last: date(2026, 3, 2),
        };
        assert_eq!(
            period.days(date(2026, 3, 20)),
            Some((date(2026, 3, 2), date(2026, 3, 10)))
        );
    }

    #[test]
    fn bounds_start_on_local_midnight() {
        let today = date(2026, 10, 21);
        let (start, end) = Period::ThisWeek.bounds(today).unwrap();
        assert_eq!(start.with_timezone(&Local).date_naive(), date(2026, 10, 19));
        assert_eq!(end.with_timezone(&Local).date_naive(), date(2026, 10, 26));
        assert!(start < end);
    }

    #[test]
    fn labels() {
        let today = date(2026, 10, 21);
        assert_eq!(Period::Today.label(today), "Today");
        assert_eq!(Period::LastWeek.label(today), "Last week");
        assert_eq!(
            Period::Days {
                first: date(2026, 9, 1),
                last: date(2026, 9, 3),
            }
            .label(today),
            "Tue, Sep 1 - Thu, Sep 3"
        );
    }
}
