//! Storage layer for the time logger.
//!
//! Provides persistence for tasks and time ranges using `rusqlite`, and runs the
//! selection transition that opens and closes ranges as the active task changes.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` can be moved between threads but not shared without external
//! synchronization. Every mutation runs inside a single `BEGIN IMMEDIATE` transaction, so other
//! connections to the same file never observe a half-applied transition.
//!
//! # Schema
//!
//! ```text
//! tasks(id, name, description, time_added, last_used, selected, hidden)
//! times(id, task_id, start, stop)
//! ```
//!
//! Timestamps are stored as INTEGER milliseconds since the Unix epoch. A `stop` of
//! `-1` marks a range that is still running. Two partial unique indexes back the
//! invariants: at most one selected task, and at most one open range per task.
//!
//! # Selection
//!
//! The `selected` flag and the open range move together: selecting a task opens a
//! range, deselecting it closes (or discards) the range, and closing, deleting or
//! reassigning an open range through the editing API updates the flag to match.

mod query;

use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};

use chrono::{DateTime, Duration, Utc};
use rusqlite::{Connection, OptionalExtension, Row, Transaction, TransactionBehavior, params};
use thiserror::Error;
use tracing::{debug, warn};

use tl_core::{DEFAULT_NOISE_THRESHOLD, MIN_GAP, RangeId, Task, TaskId, TimeRange, ValidationError};

pub use query::{TaskQuery, TaskSummary, TimeRangeRow};

/// Stored `stop` value for a range that is still running.
const OPEN_STOP: i64 = -1;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// The operation referenced a row that does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },
    /// Start, stop or boundary violates ordering or minimum-gap constraints.
    #[error("invalid range: {0}")]
    InvalidRange(String),
    /// A field failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Which table a [`Change`] touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Tasks,
    Times,
}

/// A committed mutation, delivered to subscribers so dependent views can re-query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Change {
    pub table: Table,
    /// Row id of the affected task or time range.
    pub id: i64,
}

impl Change {
    const fn task(id: TaskId) -> Self {
        Self {
            table: Table::Tasks,
            id: id.get(),
        }
    }

    const fn range(id: RangeId) -> Self {
        Self {
            table: Table::Times,
            id: id.get(),
        }
    }
}

/// Result of joining two adjacent ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Both ranges belonged to the same task and now form one row.
    Merged { id: RangeId },
    /// The ranges belong to different tasks; only their shared boundary moved.
    Adjusted { top: RangeId, bottom: RangeId },
}

/// What happened to the running range of a task that was deselected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Closed {
    Kept(RangeId),
    Discarded(RangeId),
    NothingOpen,
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
    noise_threshold: Duration,
    subscribers: Vec<Sender<Change>>,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!(path = %path.display(), journal_mode = %mode, "opened database");
        Self::with_connection(conn)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, DbError> {
        let db = Self {
            conn,
            noise_threshold: DEFAULT_NOISE_THRESHOLD,
            subscribers: Vec::new(),
        };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                time_added INTEGER NOT NULL,
                last_used INTEGER NOT NULL,
                selected INTEGER NOT NULL DEFAULT 0,
                hidden INTEGER NOT NULL DEFAULT 0
            );

            CREATE UNIQUE INDEX IF NOT EXISTS idx_tasks_selected ON tasks(selected) WHERE selected = 1;

            -- start/stop: milliseconds since the Unix epoch, stop = -1 while running
            CREATE TABLE IF NOT EXISTS times (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                task_id INTEGER NOT NULL,
                start INTEGER NOT NULL,
                stop INTEGER NOT NULL DEFAULT -1,
                FOREIGN KEY (task_id) REFERENCES tasks(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_times_task ON times(task_id);
            CREATE INDEX IF NOT EXISTS idx_times_start ON times(start);
            CREATE UNIQUE INDEX IF NOT EXISTS idx_times_open ON times(task_id) WHERE stop = -1;
            ",
        )?;
        Ok(())
    }

    /// Duration below which a range closed by deselection is deleted.
    pub const fn noise_threshold(&self) -> Duration {
        self.noise_threshold
    }

    /// Sets the noise threshold. Negative values are treated as zero.
    pub fn set_noise_threshold(&mut self, threshold: Duration) {
        self.noise_threshold = threshold.max(Duration::zero());
    }

    /// Subscribes to change notifications.
    ///
    /// One [`Change`] is sent per affected row after each committed mutation.
    /// Refused operations send nothing. Dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> Receiver<Change> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Starts a transaction that takes the write lock up front.
    ///
    /// Mutations read before they write; a deferred transaction would fail with
    /// `SQLITE_BUSY` on the lock upgrade instead of waiting out the busy timeout.
    fn write_transaction(&mut self) -> Result<Transaction<'_>, DbError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        Ok(tx)
    }

    fn notify(&mut self, changes: &[Change]) {
        if changes.is_empty() {
            return;
        }
        self.subscribers
            .retain(|subscriber| changes.iter().all(|change| subscriber.send(*change).is_ok()));
    }
}

// ========== Tasks ==========

impl Database {
    /// Creates a visible, unselected task.
    pub fn create_task(&mut self, name: &str, description: &str) -> Result<TaskId, DbError> {
        self.create_task_at(name, description, now())
    }

    pub fn create_task_at(
        &mut self,
        name: &str,
        description: &str,
        now: DateTime<Utc>,
    ) -> Result<TaskId, DbError> {
        let name = tl_core::validate_name(name)?;
        let now_ms = now.timestamp_millis();
        self.conn.execute(
            "
            INSERT INTO tasks (name, description, time_added, last_used)
            VALUES (?, ?, ?, ?)
            ",
            params![name, description.trim(), now_ms, now_ms],
        )?;
        let id = TaskId::new(self.conn.last_insert_rowid())?;
        debug!(%id, %name, "created task");
        self.notify(&[Change::task(id)]);
        Ok(id)
    }

    /// Renames a task and replaces its description.
    pub fn update_task(
        &mut self,
        id: TaskId,
        name: &str,
        description: &str,
    ) -> Result<(), DbError> {
        let name = tl_core::validate_name(name)?;
        let updated = self.conn.execute(
            "UPDATE tasks SET name = ?, description = ? WHERE id = ?",
            params![name, description.trim(), id.get()],
        )?;
        if updated == 0 {
            return Err(not_found_task(id));
        }
        self.notify(&[Change::task(id)]);
        Ok(())
    }

    /// Archives or restores a task. History is kept either way.
    pub fn set_task_hidden(&mut self, id: TaskId, hidden: bool) -> Result<(), DbError> {
        let updated = self.conn.execute(
            "UPDATE tasks SET hidden = ? WHERE id = ?",
            params![hidden, id.get()],
        )?;
        if updated == 0 {
            return Err(not_found_task(id));
        }
        debug!(%id, hidden, "changed task visibility");
        self.notify(&[Change::task(id)]);
        Ok(())
    }

    /// Fetches one task.
    pub fn get_task(&self, id: TaskId) -> Result<Task, DbError> {
        load_task(&self.conn, id)
    }

    /// The currently selected task, if any.
    pub fn selected_task(&self) -> Result<Option<Task>, DbError> {
        let task = self
            .conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE selected = 1"),
                [],
                task_from_row,
            )
            .optional()?;
        Ok(task)
    }

    /// Makes `task_id` the only selected task, or clears the selection with `None`.
    ///
    /// The previously selected task has its running range closed at now; the range
    /// is deleted instead if it is shorter than the noise threshold. The newly
    /// selected task gets a fresh open range starting now. Selecting the task that
    /// is already selected changes nothing.
    pub fn set_selected_task(&mut self, task_id: Option<TaskId>) -> Result<(), DbError> {
        self.set_selected_task_at(task_id, now())
    }

    pub fn set_selected_task_at(
        &mut self,
        task_id: Option<TaskId>,
        now: DateTime<Utc>,
    ) -> Result<(), DbError> {
        let threshold = self.noise_threshold;
        let tx = self.write_transaction()?;

        let current = selected_task_id(&tx)?;
        if let Some(id) = task_id {
            ensure_task_exists(&tx, id)?;
        }
        if current.is_some() && current == task_id {
            debug!(task = ?task_id, "task already selected");
            return Ok(());
        }

        let mut changes = Vec::new();
        if let Some(previous) = current {
            changes.push(Change::task(previous));
            match deselect(&tx, previous, now, threshold)? {
                Closed::Kept(range) => {
                    debug!(task = %previous, %range, "closed running range");
                    changes.push(Change::range(range));
                }
                Closed::Discarded(range) => {
                    debug!(task = %previous, %range, "discarded short range");
                    changes.push(Change::range(range));
                }
                Closed::NothingOpen => {}
            }
        }
        if let Some(id) = task_id {
            changes.push(Change::task(id));
            changes.extend(select(&tx, id, now)?);
        }

        tx.commit()?;
        self.notify(&changes);
        Ok(())
    }
}

// ========== Time ranges ==========

impl Database {
    /// Fetches one time range.
    pub fn get_time_range(&self, id: RangeId) -> Result<TimeRange, DbError> {
        load_range(&self.conn, id)
    }

    /// Inserts a closed range for `task_id`.
    ///
    /// Overlap with other ranges is not checked; manual edits are trusted.
    pub fn insert_time_range(
        &mut self,
        task_id: TaskId,
        start: DateTime<Utc>,
        stop: DateTime<Utc>,
    ) -> Result<RangeId, DbError> {
        check_order(start, stop)?;
        ensure_task_exists(&self.conn, task_id)?;
        self.conn.execute(
            "INSERT INTO times (task_id, start, stop) VALUES (?, ?, ?)",
            params![task_id.get(), start.timestamp_millis(), stop.timestamp_millis()],
        )?;
        let id = RangeId::new(self.conn.last_insert_rowid())?;
        debug!(%id, task = %task_id, "inserted time range");
        self.notify(&[Change::range(id)]);
        Ok(id)
    }

    /// Replaces the start and stop of a range.
    ///
    /// `stop = None` keeps a running range open and is refused for a closed range.
    /// Closing the running range of the selected task also clears the selection.
    pub fn update_time_range(
        &mut self,
        id: RangeId,
        start: DateTime<Utc>,
        stop: Option<DateTime<Utc>>,
    ) -> Result<(), DbError> {
        let tx = self.write_transaction()?;
        let range = load_range(&tx, id)?;
        match stop {
            Some(stop) => check_order(start, stop)?,
            None if !range.is_open() => {
                return Err(DbError::InvalidRange(format!(
                    "range {id} is closed and cannot be reopened"
                )));
            }
            None => {}
        }

        tx.execute(
            "UPDATE times SET start = ?, stop = ? WHERE id = ?",
            params![start.timestamp_millis(), stop_to_sql(stop), id.get()],
        )?;
        let mut changes = vec![Change::range(id)];
        if range.is_open() && stop.is_some() && clear_selection(&tx, range.task_id)? {
            changes.push(Change::task(range.task_id));
        }
        tx.commit()?;
        self.notify(&changes);
        Ok(())
    }

    /// Moves a range to another task.
    ///
    /// A running range carries the selection with it. Moving a running range onto
    /// a task that already has one is refused.
    pub fn reassign_time_range(&mut self, id: RangeId, task_id: TaskId) -> Result<(), DbError> {
        let tx = self.write_transaction()?;
        let range = load_range(&tx, id)?;
        ensure_task_exists(&tx, task_id)?;
        if range.task_id == task_id {
            return Ok(());
        }

        let mut changes = vec![Change::range(id)];
        if range.is_open() {
            if open_range(&tx, task_id)?.is_some() {
                return Err(DbError::InvalidRange(format!(
                    "task {task_id} already has a running range"
                )));
            }
            if clear_selection(&tx, range.task_id)? {
                tx.execute(
                    "UPDATE tasks SET selected = 1 WHERE id = ?",
                    params![task_id.get()],
                )?;
                changes.push(Change::task(range.task_id));
                changes.push(Change::task(task_id));
            }
        }
        tx.execute(
            "UPDATE times SET task_id = ? WHERE id = ?",
            params![task_id.get(), id.get()],
        )?;
        tx.commit()?;
        debug!(%id, from = %range.task_id, to = %task_id, "reassigned time range");
        self.notify(&changes);
        Ok(())
    }

    /// Deletes a range. Deleting the running range of the selected task clears the selection.
    pub fn delete_time_range(&mut self, id: RangeId) -> Result<(), DbError> {
        let tx = self.write_transaction()?;
        let range = load_range(&tx, id)?;
        tx.execute("DELETE FROM times WHERE id = ?", params![id.get()])?;
        let mut changes = vec![Change::range(id)];
        if range.is_open() && clear_selection(&tx, range.task_id)? {
            changes.push(Change::task(range.task_id));
        }
        tx.commit()?;
        self.notify(&changes);
        Ok(())
    }

    /// Splits a range in two at `at`, returning `(left, right)`.
    ///
    /// `at` must leave at least [`MIN_GAP`] on both sides. The existing row keeps
    /// `[start, at)`; a new row gets `[at, stop)`, staying open if the split range was.
    pub fn split_time_range(
        &mut self,
        id: RangeId,
        at: DateTime<Utc>,
    ) -> Result<(RangeId, RangeId), DbError> {
        self.split_time_range_at(id, at, now())
    }

    pub fn split_time_range_at(
        &mut self,
        id: RangeId,
        at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(RangeId, RangeId), DbError> {
        let tx = self.write_transaction()?;
        let range = load_range(&tx, id)?;
        check_cut(&range, at, now)?;

        tx.execute(
            "UPDATE times SET stop = ? WHERE id = ?",
            params![at.timestamp_millis(), id.get()],
        )?;
        tx.execute(
            "INSERT INTO times (task_id, start, stop) VALUES (?, ?, ?)",
            params![range.task_id.get(), at.timestamp_millis(), stop_to_sql(range.stop)],
        )?;
        let right = RangeId::new(tx.last_insert_rowid())?;
        tx.commit()?;

        debug!(left = %id, %right, "split time range");
        self.notify(&[Change::range(id), Change::range(right)]);
        Ok((id, right))
    }

    /// Joins two adjacent ranges. `top` is the more recent one.
    ///
    /// Ranges of the same task merge into `[bottom.start, top.stop)` on the top row
    /// and the bottom row is deleted. Ranges of different tasks keep both rows and
    /// move their shared edge to `boundary`. Either way `boundary` must lie within
    /// `[bottom.start + MIN_GAP, (top.stop ?? now) - MIN_GAP]`.
    pub fn join_time_ranges(
        &mut self,
        top: RangeId,
        bottom: RangeId,
        boundary: DateTime<Utc>,
    ) -> Result<JoinOutcome, DbError> {
        self.join_time_ranges_at(top, bottom, boundary, now())
    }

    pub fn join_time_ranges_at(
        &mut self,
        top_id: RangeId,
        bottom_id: RangeId,
        boundary: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<JoinOutcome, DbError> {
        if top_id == bottom_id {
            return Err(DbError::InvalidRange(format!(
                "cannot join range {top_id} with itself"
            )));
        }
        let tx = self.write_transaction()?;
        let top = load_range(&tx, top_id)?;
        let bottom = load_range(&tx, bottom_id)?;
        if top.start < bottom.start {
            return Err(DbError::InvalidRange(format!(
                "range {top_id} starts before range {bottom_id}"
            )));
        }
        if bottom.is_open() {
            return Err(DbError::InvalidRange(format!(
                "older range {bottom_id} is still running"
            )));
        }

        let earliest = bottom.start + MIN_GAP;
        let latest = top.end_at(now) - MIN_GAP;
        if earliest > latest || boundary < earliest || boundary > latest {
            return Err(DbError::InvalidRange(format!(
                "join boundary {boundary} must be between {earliest} and {latest}"
            )));
        }

        let outcome = if top.task_id == bottom.task_id {
            tx.execute(
                "UPDATE times SET start = ? WHERE id = ?",
                params![bottom.start.timestamp_millis(), top_id.get()],
            )?;
            tx.execute("DELETE FROM times WHERE id = ?", params![bottom_id.get()])?;
            JoinOutcome::Merged { id: top_id }
        } else {
            let boundary_ms = boundary.timestamp_millis();
            tx.execute(
                "UPDATE times SET start = ? WHERE id = ?",
                params![boundary_ms, top_id.get()],
            )?;
            tx.execute(
                "UPDATE times SET stop = ? WHERE id = ?",
                params![boundary_ms, bottom_id.get()],
            )?;
            JoinOutcome::Adjusted {
                top: top_id,
                bottom: bottom_id,
            }
        };
        tx.commit()?;

        debug!(top = %top_id, bottom = %bottom_id, ?outcome, "joined time ranges");
        self.notify(&[Change::range(top_id), Change::range(bottom_id)]);
        Ok(outcome)
    }
}

// ========== Transition steps ==========

/// Clears the selection of `task_id`, closing its running range at `now`.
fn deselect(
    tx: &Transaction<'_>,
    task_id: TaskId,
    now: DateTime<Utc>,
    threshold: Duration,
) -> Result<Closed, DbError> {
    tx.execute(
        "UPDATE tasks SET selected = 0, last_used = ? WHERE id = ?",
        params![now.timestamp_millis(), task_id.get()],
    )?;
    let Some(range) = open_range(tx, task_id)? else {
        return Ok(Closed::NothingOpen);
    };
    close_range(tx, &range, now, threshold)
}

/// Selects `task_id` and opens a new range for it starting at `now`.
fn select(tx: &Transaction<'_>, task_id: TaskId, now: DateTime<Utc>) -> Result<Vec<Change>, DbError> {
    let mut changes = Vec::new();
    if let Some(stale) = open_range(tx, task_id)? {
        warn!(task = %task_id, range = %stale.id, "unselected task had a running range; closing it");
        if let Closed::Kept(id) | Closed::Discarded(id) =
            close_range(tx, &stale, now, Duration::zero())?
        {
            changes.push(Change::range(id));
        }
    }

    let now_ms = now.timestamp_millis();
    tx.execute(
        "UPDATE tasks SET selected = 1, last_used = ? WHERE id = ?",
        params![now_ms, task_id.get()],
    )?;
    tx.execute(
        "INSERT INTO times (task_id, start, stop) VALUES (?, ?, ?)",
        params![task_id.get(), now_ms, OPEN_STOP],
    )?;
    let id = RangeId::new(tx.last_insert_rowid())?;
    debug!(task = %task_id, range = %id, "opened time range");
    changes.push(Change::range(id));
    Ok(changes)
}

/// Sets the stop of an open range to `now`, or deletes it when it would be shorter
/// than `threshold` or empty.
fn close_range(
    tx: &Transaction<'_>,
    range: &TimeRange,
    now: DateTime<Utc>,
    threshold: Duration,
) -> Result<Closed, DbError> {
    let duration = range.duration_at(now);
    if duration <= Duration::zero() || duration < threshold {
        tx.execute("DELETE FROM times WHERE id = ?", params![range.id.get()])?;
        return Ok(Closed::Discarded(range.id));
    }
    tx.execute(
        "UPDATE times SET stop = ? WHERE id = ?",
        params![now.timestamp_millis(), range.id.get()],
    )?;
    Ok(Closed::Kept(range.id))
}

/// Clears `selected` on `task_id`. Returns true if the flag was set.
fn clear_selection(conn: &Connection, task_id: TaskId) -> Result<bool, DbError> {
    let updated = conn.execute(
        "UPDATE tasks SET selected = 0 WHERE id = ? AND selected = 1",
        params![task_id.get()],
    )?;
    Ok(updated > 0)
}

// ========== Validation ==========

fn check_order(start: DateTime<Utc>, stop: DateTime<Utc>) -> Result<(), DbError> {
    if stop <= start {
        return Err(DbError::InvalidRange(format!(
            "stop {stop} must be after start {start}"
        )));
    }
    Ok(())
}

fn check_cut(range: &TimeRange, at: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), DbError> {
    let Some((earliest, latest)) = range.cut_window(now) else {
        return Err(DbError::InvalidRange(format!(
            "range {} is too short to split",
            range.id
        )));
    };
    if at < earliest || at > latest {
        return Err(DbError::InvalidRange(format!(
            "split point {at} must be between {earliest} and {latest}"
        )));
    }
    Ok(())
}

// ========== Row access ==========

const TASK_COLUMNS: &str = "id, name, description, time_added, last_used, selected, hidden";
const RANGE_COLUMNS: &str = "id, task_id, start, stop";

fn now() -> DateTime<Utc> {
    // Stored with millisecond precision, so compare at the same precision.
    millis_to_datetime(Utc::now().timestamp_millis()).unwrap_or_else(Utc::now)
}

fn millis_to_datetime(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
}

fn stop_to_sql(stop: Option<DateTime<Utc>>) -> i64 {
    stop.map_or(OPEN_STOP, |stop| stop.timestamp_millis())
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let ms: i64 = row.get(idx)?;
    millis_to_datetime(ms).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, ms))
}

fn stop_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let ms: i64 = row.get(idx)?;
    if ms == OPEN_STOP {
        return Ok(None);
    }
    millis_to_datetime(ms)
        .map(Some)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, ms))
}

fn task_id_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<TaskId> {
    let id: i64 = row.get(idx)?;
    TaskId::new(id).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(idx, id))
}

fn range_id_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<RangeId> {
    let id: i64 = row.get(idx)?;
    RangeId::new(id).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(idx, id))
}

/// Maps a row selected with [`TASK_COLUMNS`].
fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: task_id_column(row, 0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        time_added: timestamp_column(row, 3)?,
        last_used: timestamp_column(row, 4)?,
        selected: row.get(5)?,
        hidden: row.get(6)?,
    })
}

/// Maps a row selected with [`RANGE_COLUMNS`].
fn range_from_row(row: &Row<'_>) -> rusqlite::Result<TimeRange> {
    Ok(TimeRange {
        id: range_id_column(row, 0)?,
        task_id: task_id_column(row, 1)?,
        start: timestamp_column(row, 2)?,
        stop: stop_column(row, 3)?,
    })
}

fn load_task(conn: &Connection, id: TaskId) -> Result<Task, DbError> {
    conn.query_row(
        &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?"),
        params![id.get()],
        task_from_row,
    )
    .optional()?
    .ok_or_else(|| not_found_task(id))
}

fn load_range(conn: &Connection, id: RangeId) -> Result<TimeRange, DbError> {
    conn.query_row(
        &format!("SELECT {RANGE_COLUMNS} FROM times WHERE id = ?"),
        params![id.get()],
        range_from_row,
    )
    .optional()?
    .ok_or(DbError::NotFound {
        entity: "time range",
        id: id.get(),
    })
}

fn open_range(conn: &Connection, task_id: TaskId) -> Result<Option<TimeRange>, DbError> {
    let range = conn
        .query_row(
            &format!("SELECT {RANGE_COLUMNS} FROM times WHERE task_id = ? AND stop = ?"),
            params![task_id.get(), OPEN_STOP],
            range_from_row,
        )
        .optional()?;
    Ok(range)
}

fn selected_task_id(conn: &Connection) -> Result<Option<TaskId>, DbError> {
    let id = conn
        .query_row("SELECT id FROM tasks WHERE selected = 1", [], |row| {
            task_id_column(row, 0)
        })
        .optional()?;
    Ok(id)
}

fn ensure_task_exists(conn: &Connection, id: TaskId) -> Result<(), DbError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM tasks WHERE id = ?)",
        params![id.get()],
        |row| row.get(0),
    )?;
    if exists {
        Ok(())
    } else {
        Err(not_found_task(id))
    }
}

const fn not_found_task(id: TaskId) -> DbError {
    DbError::NotFound {
        entity: "task",
        id: id.get(),
    }
}
