//! Read-only listings that join tasks with their recorded time.

use chrono::{DateTime, Duration, Utc};
use rusqlite::params;

use tl_core::{RangeSort, Task, TaskSort, TimeRange};

use crate::{
    Database, DbError, OPEN_STOP, RANGE_COLUMNS, TASK_COLUMNS, now, range_from_row, task_from_row,
};

/// Filter and ordering for [`Database::list_tasks`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskQuery {
    /// Half-open `[start, end)` interval; ranges count when their start falls inside.
    /// `None` counts every range.
    pub period: Option<(DateTime<Utc>, DateTime<Utc>)>,
    /// Include hidden tasks even when they have no time in the period.
    pub include_hidden: bool,
    pub sort: TaskSort,
}

/// A task with its total recorded time over the queried period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSummary {
    pub task: Task,
    pub duration: Duration,
}

/// A time range joined with the name and description of its task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRangeRow {
    pub range: TimeRange,
    pub task_name: String,
    pub task_description: String,
    pub duration: Duration,
}

const fn task_order_by(sort: TaskSort) -> &'static str {
    match sort {
        TaskSort::Name => "hidden ASC, name COLLATE NOCASE ASC, id ASC",
        TaskSort::Usage => "hidden ASC, last_used DESC, id ASC",
        TaskSort::Created => "hidden ASC, time_added DESC, id DESC",
    }
}

const fn range_order_by(sort: RangeSort) -> &'static str {
    match sort {
        RangeSort::StartDesc => "r.start DESC, r.id DESC",
        RangeSort::StartAsc => "r.start ASC, r.id ASC",
    }
}

impl Database {
    /// Lists tasks with their summed duration.
    ///
    /// Hidden tasks with no time in the period are left out unless
    /// `include_hidden` is set. Hidden tasks always sort after visible ones.
    pub fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<TaskSummary>, DbError> {
        self.list_tasks_at(query, now())
    }

    pub fn list_tasks_at(
        &self,
        query: &TaskQuery,
        now: DateTime<Utc>,
    ) -> Result<Vec<TaskSummary>, DbError> {
        let (start_ms, end_ms) = query.period.map_or((i64::MIN, i64::MAX), |(start, end)| {
            (start.timestamp_millis(), end.timestamp_millis())
        });
        let sql = format!(
            "
            SELECT {TASK_COLUMNS},
                COALESCE((
                    SELECT SUM(CASE WHEN r.stop = ?1 THEN ?2 ELSE r.stop END - r.start)
                    FROM times r
                    WHERE r.task_id = tasks.id AND r.start >= ?3 AND r.start < ?4
                ), 0) AS duration
            FROM tasks
            WHERE ?5 OR hidden = 0 OR duration > 0
            ORDER BY {}
            ",
            task_order_by(query.sort)
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![
                OPEN_STOP,
                now.timestamp_millis(),
                start_ms,
                end_ms,
                query.include_hidden
            ],
            |row| {
                let task = task_from_row(row)?;
                let duration_ms: i64 = row.get(7)?;
                Ok(TaskSummary {
                    task,
                    duration: Duration::milliseconds(duration_ms),
                })
            },
        )?;

        let mut summaries = Vec::new();
        for row in rows {
            summaries.push(row?);
        }
        Ok(summaries)
    }

    /// Lists every time range with its task's name, in the requested start order.
    pub fn list_time_ranges(&self, sort: RangeSort) -> Result<Vec<TimeRangeRow>, DbError> {
        self.list_time_ranges_at(sort, now())
    }

    pub fn list_time_ranges_at(
        &self,
        sort: RangeSort,
        now: DateTime<Utc>,
    ) -> Result<Vec<TimeRangeRow>, DbError> {
        let columns = RANGE_COLUMNS
            .split(", ")
            .map(|column| format!("r.{column}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "
            SELECT {columns}, t.name, t.description
            FROM times r
            INNER JOIN tasks t ON t.id = r.task_id
            ORDER BY {}
            ",
            range_order_by(sort)
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            let range = range_from_row(row)?;
            let duration = range.duration_at(now);
            Ok(TimeRangeRow {
                range,
                task_name: row.get(4)?,
                task_description: row.get(5)?,
                duration,
            })
        })?;

        let mut ranges = Vec::new();
        for row in rows {
            ranges.push(row?);
        }
        Ok(ranges)
    }
}
