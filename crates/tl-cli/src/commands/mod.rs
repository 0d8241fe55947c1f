//! CLI subcommand implementations.

pub mod range;
pub mod ranges;
pub mod select;
pub mod status;
pub mod task;
pub mod tasks;
pub mod util;
