//! Time range editing: add, edit, delete, split, join and move.

use std::io::Write;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Duration, Utc};
use clap::Subcommand;

use tl_core::format::{format_time, parse_hours};
use tl_core::{RangeId, TaskId};
use tl_db::JoinOutcome;

use super::util::{open_database, parse_datetime};
use crate::Config;

#[derive(Debug, Subcommand)]
pub enum RangeAction {
    /// Record a finished range by hand.
    Add {
        /// Task the time was spent on.
        task: TaskId,
        /// Start time (RFC 3339, "YYYY-MM-DD HH:MM" or "N minutes ago").
        #[arg(long)]
        start: String,
        /// Stop time, same formats as --start.
        #[arg(long, required_unless_present = "hours")]
        stop: Option<String>,
        /// Length in decimal hours (e.g. 1.5), instead of --stop.
        #[arg(long, conflicts_with = "stop")]
        hours: Option<String>,
    },
    /// Change the start or stop of a range.
    Edit {
        /// Range ID.
        id: RangeId,
        /// New start time.
        #[arg(long)]
        start: Option<String>,
        /// New stop time.
        #[arg(long)]
        stop: Option<String>,
    },
    /// Delete a range.
    Delete {
        /// Range ID.
        id: RangeId,
    },
    /// Split a range in two at the given time.
    Split {
        /// Range ID.
        id: RangeId,
        /// Split point; at least one minute from either end.
        #[arg(long)]
        at: String,
    },
    /// Join a range with the one before it.
    Join {
        /// The more recent range.
        top: RangeId,
        /// The older range.
        bottom: RangeId,
        /// New shared boundary when the ranges belong to different tasks.
        /// Defaults to the older range's stop time.
        #[arg(long)]
        at: Option<String>,
    },
    /// Move a range to another task.
    Move {
        /// Range ID.
        id: RangeId,
        /// Destination task.
        task: TaskId,
    },
}

pub fn run<W: Write>(writer: &mut W, action: &RangeAction, config: &Config) -> Result<()> {
    let mut db = open_database(config)?;
    match action {
        RangeAction::Add {
            task,
            start,
            stop,
            hours,
        } => {
            let start = parse_time("start", start)?;
            let stop = match (stop, hours) {
                (Some(stop), _) => parse_time("stop", stop)?,
                (None, Some(hours)) => stop_after(start, hours)?,
                (None, None) => bail!("pass --stop or --hours"),
            };
            let id = db.insert_time_range(*task, start, stop)?;
            writeln!(writer, "Added range {id} to task {task}")?;
        }
        RangeAction::Edit { id, start, stop } => {
            if start.is_none() && stop.is_none() {
                bail!("nothing to change: pass --start and/or --stop");
            }
            let range = db.get_time_range(*id)?;
            let start = start
                .as_deref()
                .map(|s| parse_time("start", s))
                .transpose()?
                .unwrap_or(range.start);
            let stop = match stop {
                Some(s) => Some(parse_time("stop", s)?),
                None => range.stop,
            };
            db.update_time_range(*id, start, stop)?;
            writeln!(writer, "Updated range {id}")?;
        }
        RangeAction::Delete { id } => {
            db.delete_time_range(*id)?;
            writeln!(writer, "Deleted range {id}")?;
        }
        RangeAction::Split { id, at } => {
            let at = parse_time("split point", at)?;
            let (left, right) = db.split_time_range(*id, at)?;
            writeln!(
                writer,
                "Split range {id} at {} into {left} and {right}",
                format_time(at)
            )?;
        }
        RangeAction::Join { top, bottom, at } => {
            let boundary = match at {
                Some(s) => parse_time("boundary", s)?,
                None => db
                    .get_time_range(*bottom)?
                    .stop
                    .with_context(|| format!("range {bottom} is still running"))?,
            };
            match db.join_time_ranges(*top, *bottom, boundary)? {
                JoinOutcome::Merged { id } => {
                    writeln!(writer, "Merged ranges {bottom} and {top} into {id}")?;
                }
                JoinOutcome::Adjusted { top, bottom } => writeln!(
                    writer,
                    "Moved boundary between ranges {bottom} and {top} to {}",
                    format_time(boundary)
                )?,
            }
        }
        RangeAction::Move { id, task } => {
            db.reassign_time_range(*id, *task)?;
            writeln!(writer, "Moved range {id} to task {task}")?;
        }
    }
    Ok(())
}

fn parse_time(what: &str, value: &str) -> Result<DateTime<Utc>> {
    parse_datetime(value).with_context(|| format!("invalid {what}"))
}

fn stop_after(start: DateTime<Utc>, hours: &str) -> Result<DateTime<Utc>> {
    let length = Duration::try_milliseconds(parse_hours(hours)?)
        .with_context(|| format!("--hours too large: {hours}"))?;
    start
        .checked_add_signed(length)
        .with_context(|| format!("--hours too large: {hours}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;
    use tl_db::Database;

    fn config_in(temp: &tempfile::TempDir) -> Config {
        Config {
            database_path: temp.path().join("tl.db"),
            ..Config::default()
        }
    }

    fn range_id(id: i64) -> RangeId {
        RangeId::new(id).unwrap()
    }

    fn add(task: i64, start: &str, stop: &str) -> RangeAction {
        RangeAction::Add {
            task: TaskId::new(task).unwrap(),
            start: start.to_string(),
            stop: Some(stop.to_string()),
            hours: None,
        }
    }

    fn add_hours(task: i64, start: &str, hours: &str) -> RangeAction {
        RangeAction::Add {
            task: TaskId::new(task).unwrap(),
            start: start.to_string(),
            stop: None,
            hours: Some(hours.to_string()),
        }
    }

    fn setup(names: &[&str]) -> (tempfile::TempDir, Config) {
        let temp = tempfile::tempdir().unwrap();
        let config = config_in(&temp);
        let mut db = Database::open(&config.database_path).unwrap();
        for name in names {
            db.create_task(name, "").unwrap();
        }
        (temp, config)
    }

    #[test]
    fn add_split_and_join_back() {
        let (_temp, config) = setup(&["Project 1"]);
        let mut output = Vec::new();

        run(
            &mut output,
            &add(1, "2013-12-31T08:00:00Z", "2013-12-31T10:00:00Z"),
            &config,
        )
        .unwrap();
        run(
            &mut output,
            &RangeAction::Split {
                id: range_id(1),
                at: "2013-12-31T09:00:00Z".to_string(),
            },
            &config,
        )
        .unwrap();
        run(
            &mut output,
            &RangeAction::Join {
                top: range_id(2),
                bottom: range_id(1),
                at: None,
            },
            &config,
        )
        .unwrap();

        let output = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "Added range 1 to task 1");
        assert!(lines[1].starts_with("Split range 1 at "));
        assert!(lines[1].ends_with(" into 1 and 2"));
        assert_eq!(lines[2], "Merged ranges 1 and 2 into 2");

        let db = Database::open(&config.database_path).unwrap();
        let merged = db.get_time_range(range_id(2)).unwrap();
        assert_eq!(merged.start.to_rfc3339(), "2013-12-31T08:00:00+00:00");
        assert_eq!(
            merged.stop.map(|t| t.to_rfc3339()).as_deref(),
            Some("2013-12-31T10:00:00+00:00")
        );
    }

    #[test]
    fn join_different_tasks_defaults_to_bottom_stop() {
        let (_temp, config) = setup(&["Project 1", "Project 2"]);
        let mut output = Vec::new();
        run(&mut output, &add(1, "2013-12-31T10:00:00Z", "2013-12-31T10:20:00Z"), &config).unwrap();
        run(&mut output, &add(2, "2013-12-31T10:25:00Z", "2013-12-31T10:40:00Z"), &config).unwrap();
        output.clear();

        run(
            &mut output,
            &RangeAction::Join {
                top: range_id(2),
                bottom: range_id(1),
                at: None,
            },
            &config,
        )
        .unwrap();
        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with("Moved boundary between ranges 1 and 2 to "));

        let db = Database::open(&config.database_path).unwrap();
        assert_eq!(
            db.get_time_range(range_id(2)).unwrap().start,
            db.get_time_range(range_id(1)).unwrap().stop.unwrap()
        );
    }

    #[test]
    fn edit_move_and_delete() {
        let (_temp, config) = setup(&["Project 1", "Project 2"]);
        let mut output = Vec::new();
        run(&mut output, &add(1, "2013-12-31T10:00:00Z", "2013-12-31T10:20:00Z"), &config).unwrap();
        run(
            &mut output,
            &RangeAction::Edit {
                id: range_id(1),
                start: None,
                stop: Some("2013-12-31T11:00:00Z".to_string()),
            },
            &config,
        )
        .unwrap();
        run(
            &mut output,
            &RangeAction::Move {
                id: range_id(1),
                task: TaskId::new(2).unwrap(),
            },
            &config,
        )
        .unwrap();
        {
            let db = Database::open(&config.database_path).unwrap();
            let range = db.get_time_range(range_id(1)).unwrap();
            assert_eq!(range.task_id.get(), 2);
            assert_eq!(range.duration_at(Utc::now()).num_minutes(), 60);
        }
        run(&mut output, &RangeAction::Delete { id: range_id(1) }, &config).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        Added range 1 to task 1
        Updated range 1
        Moved range 1 to task 2
        Deleted range 1
        ");
    }

    #[test]
    fn add_with_hours_sets_stop_from_start() {
        let (_temp, config) = setup(&["Project 1"]);
        let mut output = Vec::new();
        run(&mut output, &add_hours(1, "2013-12-31T08:00:00Z", "1.5"), &config).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "Added range 1 to task 1\n");

        let db = Database::open(&config.database_path).unwrap();
        let range = db.get_time_range(range_id(1)).unwrap();
        assert_eq!(
            range.stop.map(|t| t.to_rfc3339()).as_deref(),
            Some("2013-12-31T09:30:00+00:00")
        );
    }

    #[test]
    fn add_with_bad_hours_is_refused() {
        let (_temp, config) = setup(&["Project 1"]);
        let mut output = Vec::new();

        let err = run(&mut output, &add_hours(1, "2013-12-31T08:00:00Z", "soon"), &config)
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid duration: soon");

        let err = run(&mut output, &add_hours(1, "2013-12-31T08:00:00Z", "-1"), &config)
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid duration: -1");

        let err = run(&mut output, &add_hours(1, "2013-12-31T08:00:00Z", "1e30"), &config)
            .unwrap_err();
        assert_eq!(err.to_string(), "--hours too large: 1e30");

        let err = run(&mut output, &add_hours(1, "2013-12-31T08:00:00Z", "0"), &config)
            .unwrap_err();
        assert!(err.to_string().starts_with("invalid range:"));
        assert!(output.is_empty());
    }

    #[test]
    fn refusals_surface_engine_errors() {
        let (_temp, config) = setup(&["Project 1"]);
        let mut output = Vec::new();
        run(&mut output, &add(1, "2013-12-31T08:00:00Z", "2013-12-31T10:00:00Z"), &config).unwrap();

        let err = run(
            &mut output,
            &RangeAction::Split {
                id: range_id(1),
                at: "2013-12-31T08:00:30Z".to_string(),
            },
            &config,
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("invalid range:"));

        let err = run(&mut output, &add(1, "2013-12-31T10:00:00Z", "2013-12-31T09:00:00Z"), &config)
            .unwrap_err();
        assert!(err.to_string().starts_with("invalid range:"));

        let err = run(&mut output, &add(1, "yesterday-ish", "2013-12-31T09:00:00Z"), &config)
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid start");

        let err = run(&mut output, &RangeAction::Delete { id: range_id(8) }, &config).unwrap_err();
        assert_eq!(err.to_string(), "time range not found: 8");
    }
}
