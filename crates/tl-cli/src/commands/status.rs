//! Status command for showing the running task.

use std::io::Write;

use anyhow::Result;
use chrono::Utc;

use tl_core::RangeSort;
use tl_core::format::{format_hours, format_time};

use super::util::open_database;
use crate::Config;

pub fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    let db = open_database(config)?;

    writeln!(writer, "Time logger status")?;
    writeln!(writer, "Database: {}", config.database_path.display())?;

    let Some(task) = db.selected_task()? else {
        writeln!(writer, "Nothing running.")?;
        return Ok(());
    };

    let now = Utc::now();
    let running = db
        .list_time_ranges_at(RangeSort::StartDesc, now)?
        .into_iter()
        .find(|row| row.range.task_id == task.id && row.range.is_open());

    writeln!(writer, "Running: {} (task {})", task.name, task.id)?;
    match running {
        Some(row) => writeln!(
            writer,
            "Since {} ({} h)",
            format_time(row.range.start),
            format_hours(row.range.duration_at(now).num_milliseconds())
        )?,
        None => tracing::warn!(task = %task.id, "selected task has no running range"),
    }
    Ok(())
}
