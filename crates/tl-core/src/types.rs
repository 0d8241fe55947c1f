//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// A row identifier was zero or negative.
    #[error("{field} must be positive, got {value}")]
    NonPositiveId { field: &'static str, value: i64 },

    /// A row identifier was not an integer.
    #[error("invalid {field}: {value}")]
    InvalidId { field: &'static str, value: String },

    /// Invalid sort order value.
    #[error("invalid sort order: {value} (expected name, usage or created)")]
    InvalidSort { value: String },

    /// A duration string could not be parsed as decimal hours.
    #[error("invalid duration: {value}")]
    InvalidDuration { value: String },
}

/// Generates a validated integer row ID newtype with common trait implementations.
macro_rules! define_row_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "i64", into = "i64")]
        pub struct $name(i64);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: i64) -> Result<Self, ValidationError> {
                if id <= 0 {
                    return Err(ValidationError::NonPositiveId {
                        field: $field_name,
                        value: id,
                    });
                }
                Ok(Self(id))
            }

            /// Returns the raw row ID.
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl TryFrom<i64> for $name {
            type Error = ValidationError;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s.trim().parse::<i64>().map_err(|_| ValidationError::InvalidId {
                    field: $field_name,
                    value: s.to_string(),
                })?;
                Self::new(value)
            }
        }
    };
}

define_row_id!(
    /// A validated task identifier.
    ///
    /// Task IDs are positive integers assigned by the database on insert.
    TaskId, "task ID"
);

define_row_id!(
    /// A validated time range identifier.
    RangeId, "range ID"
);

/// Trims a task name and rejects blank values.
pub fn validate_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::Empty { field: "task name" });
    }
    Ok(name.to_string())
}

/// Sort order for task listings.
///
/// Hidden tasks always sort after visible ones; this picks the secondary key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskSort {
    /// Case-insensitive name, ascending.
    #[default]
    Name,
    /// Most recently used first.
    Usage,
    /// Most recently created first.
    Created,
}

impl TaskSort {
    /// String representation for config files and CLI flags.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Usage => "usage",
            Self::Created => "created",
        }
    }
}

impl fmt::Display for TaskSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TaskSort {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "usage" | "last-used" => Ok(Self::Usage),
            "created" | "creation" => Ok(Self::Created),
            _ => Err(ValidationError::InvalidSort {
                value: s.to_string(),
            }),
        }
    }
}

/// Sort order for time range listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeSort {
    /// Most recent start first.
    #[default]
    StartDesc,
    /// Oldest start first.
    StartAsc,
}
