//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::range::RangeAction;
use crate::commands::ranges::RangesArgs;
use crate::commands::select::SelectArgs;
use crate::commands::task::TaskAction;
use crate::commands::tasks::TasksArgs;

/// Task time logger.
///
/// Select a task to start timing it; selecting another task or running
/// `tl stop` closes the running range.
#[derive(Debug, Parser)]
#[command(name = "tl", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create and edit tasks.
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },

    /// List tasks with the time spent on them.
    Tasks(TasksArgs),

    /// Start timing a task, stopping the running one.
    Select(SelectArgs),

    /// Stop timing the running task.
    Stop,

    /// Show the running task.
    Status,

    /// List recorded time ranges.
    Ranges(RangesArgs),

    /// Add, edit, split and join time ranges.
    Range {
        #[command(subcommand)]
        action: RangeAction,
    },
}
