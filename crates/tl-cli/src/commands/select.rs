//! Start and stop timing.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use tl_core::TaskId;

use super::util::open_database;
use crate::Config;

#[derive(Debug, Args)]
pub struct SelectArgs {
    /// Task to start timing.
    pub id: TaskId,
}

/// Selects a task, stopping whichever task was running.
pub fn run<W: Write>(writer: &mut W, args: &SelectArgs, config: &Config) -> Result<()> {
    let mut db = open_database(config)?;
    let previous = db.selected_task()?;
    if previous.as_ref().is_some_and(|task| task.id == args.id) {
        let task = db.get_task(args.id)?;
        writeln!(writer, "Already running {} (task {})", task.name, task.id)?;
        return Ok(());
    }

    db.set_selected_task(Some(args.id))?;
    if let Some(task) = previous {
        writeln!(writer, "Stopped {} (task {})", task.name, task.id)?;
    }
    let task = db.get_task(args.id)?;
    writeln!(writer, "Started {} (task {})", task.name, task.id)?;
    Ok(())
}

/// Clears the selection.
pub fn stop<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    let mut db = open_database(config)?;
    let Some(task) = db.selected_task()? else {
        writeln!(writer, "Nothing running.")?;
        return Ok(());
    };
    db.set_selected_task(None)?;
    writeln!(writer, "Stopped {} (task {})", task.name, task.id)?;
    Ok(())
}
