//! Core domain types for the time logger.
//!
//! This crate contains the fundamental types shared by the store and the CLI:
//! - Tasks and time ranges, with derived durations
//! - Validated row identifiers and sort orders
//! - Reporting periods and display formatting

pub mod format;
mod model;
pub mod period;
mod types;

pub use model::{DEFAULT_NOISE_THRESHOLD, MIN_GAP, Task, TimeRange};
pub use period::Period;
pub use types::{RangeId, RangeSort, TaskId, TaskSort, ValidationError, validate_name};
