//! Task management: create, edit, hide and unhide.

use std::io::Write;

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};

use tl_core::TaskId;

use super::util::open_database;
use crate::Config;

#[derive(Debug, Subcommand)]
pub enum TaskAction {
    /// Create a task.
    Add(AddArgs),
    /// Rename a task or change its description.
    Edit(EditArgs),
    /// Hide a task from default listings. Its history is kept.
    Hide {
        /// Task ID.
        id: TaskId,
    },
    /// Show a hidden task again.
    Unhide {
        /// Task ID.
        id: TaskId,
    },
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Task name.
    pub name: String,
    /// Optional description.
    #[arg(short, long, default_value = "")]
    pub description: String,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Task ID.
    pub id: TaskId,
    /// New name.
    #[arg(long)]
    pub name: Option<String>,
    /// New description.
    #[arg(short, long)]
    pub description: Option<String>,
}

pub fn run<W: Write>(writer: &mut W, action: &TaskAction, config: &Config) -> Result<()> {
    let mut db = open_database(config)?;
    match action {
        TaskAction::Add(args) => {
            let id = db
                .create_task(&args.name, &args.description)
                .context("failed to create task")?;
            writeln!(writer, "Created task {id}: {}", args.name.trim())?;
        }
        TaskAction::Edit(args) => {
            if args.name.is_none() && args.description.is_none() {
                bail!("nothing to change: pass --name and/or --description");
            }
            let task = db.get_task(args.id)?;
            let name = args.name.as_deref().unwrap_or(&task.name);
            let description = args.description.as_deref().unwrap_or(&task.description);
            db.update_task(args.id, name, description)?;
            writeln!(writer, "Updated task {}: {}", args.id, name.trim())?;
        }
        TaskAction::Hide { id } => {
            db.set_task_hidden(*id, true)?;
            let task = db.get_task(*id)?;
            writeln!(writer, "Hid task {id}: {}", task.name)?;
        }
        TaskAction::Unhide { id } => {
            db.set_task_hidden(*id, false)?;
            let task = db.get_task(*id)?;
            writeln!(writer, "Unhid task {id}: {}", task.name)?;
        }
    }
    Ok(())
}
