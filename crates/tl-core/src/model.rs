//! Tasks and the time ranges recorded against them.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{RangeId, TaskId};

/// Minimum distance between a split or join point and either end of a range.
pub const MIN_GAP: Duration = Duration::seconds(60);

/// Default duration below which an auto-closed range is discarded.
pub const DEFAULT_NOISE_THRESHOLD: Duration = Duration::seconds(60);

/// A user-defined category of work being timed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub description: String,
    pub time_added: DateTime<Utc>,
    pub last_used: DateTime<Utc>,
    /// Whether this task is currently being timed. At most one task is selected.
    pub selected: bool,
    /// Archived tasks keep their history but drop out of default listings.
    pub hidden: bool,
}

/// One recorded interval of work on a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub id: RangeId,
    pub task_id: TaskId,
    pub start: DateTime<Utc>,
    /// `None` while the range is still running.
    pub stop: Option<DateTime<Utc>>,
}

impl TimeRange {
    /// Returns true if the range has no stop time yet.
    pub const fn is_open(&self) -> bool {
        self.stop.is_none()
    }

    /// The effective end of the range, treating an open range as running until `now`.
    pub fn end_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.stop.unwrap_or(now)
    }

    /// Derived duration, `(stop ?? now) - start`.
    pub fn duration_at(&self, now: DateTime<Utc>) -> Duration {
        self.end_at(now) - self.start
    }

    /// The inclusive window in which this range may be cut.
    ///
    /// Returns `None` when the range is too short to leave [`MIN_GAP`] on both sides.
    pub fn cut_window(&self, now: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let earliest = self.start + MIN_GAP;
        let latest = self.end_at(now) - MIN_GAP;
        (earliest <= latest).then_some((earliest, latest))
    }
}
