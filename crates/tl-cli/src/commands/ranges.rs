//! Time range listing.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate, Utc};
use clap::Args;
use serde::Serialize;

use tl_core::RangeSort;
use tl_core::format::{format_date, format_hours, format_time};
use tl_db::TimeRangeRow;

use super::util::open_database;
use crate::Config;

#[derive(Debug, Default, Args)]
pub struct RangesArgs {
    /// Oldest first.
    #[arg(long)]
    pub asc: bool,
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct RangeEntry {
    id: i64,
    task_id: i64,
    task_name: String,
    task_description: String,
    start: DateTime<Utc>,
    stop: Option<DateTime<Utc>>,
    duration_ms: i64,
    hours: String,
}

impl From<&TimeRangeRow> for RangeEntry {
    fn from(row: &TimeRangeRow) -> Self {
        let duration_ms = row.duration.num_milliseconds();
        Self {
            id: row.range.id.get(),
            task_id: row.range.task_id.get(),
            task_name: row.task_name.clone(),
            task_description: row.task_description.clone(),
            start: row.range.start,
            stop: row.range.stop,
            duration_ms,
            hours: format_hours(duration_ms),
        }
    }
}

pub fn run<W: Write>(writer: &mut W, args: &RangesArgs, config: &Config) -> Result<()> {
    let db = open_database(config)?;
    let sort = if args.asc {
        RangeSort::StartAsc
    } else {
        RangeSort::StartDesc
    };
    let rows = db.list_time_ranges(sort)?;

    if args.json {
        let entries: Vec<RangeEntry> = rows.iter().map(RangeEntry::from).collect();
        writeln!(writer, "{}", serde_json::to_string_pretty(&entries)?)?;
    } else {
        write!(writer, "{}", format_ranges(&rows, Local::now().date_naive()))?;
    }
    Ok(())
}

/// Groups ranges under a header per local start date.
pub fn format_ranges(rows: &[TimeRangeRow], today: NaiveDate) -> String {
    let mut output = String::new();
    if rows.is_empty() {
        let _ = writeln!(output, "No time recorded.");
        return output;
    }

    let mut current_date = None;
    for row in rows {
        let date = row.range.start.with_timezone(&Local).date_naive();
        if current_date != Some(date) {
            if current_date.is_some() {
                let _ = writeln!(output);
            }
            let _ = writeln!(output, "{}", format_date(date, today));
            current_date = Some(date);
        }
        let stop = row
            .range
            .stop
            .map_or_else(|| "running".to_string(), format_time);
        let _ = writeln!(
            output,
            "{:>5}  {:>8} - {:<8}  {:>7}  {}",
            row.range.id.get(),
            format_time(row.range.start),
            stop,
            format_hours(row.duration.num_milliseconds()),
            row.task_name
        );
    }
    output
}
