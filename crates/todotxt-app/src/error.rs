//! Error type shared by the repository and the operation layer.

use anyhow::Error;

/// Result alias for repository and service operations.
pub type TodoResult<T> = Result<T, TodoError>;

/// Errors surfaced by [`Repository`](crate::Repository) and
/// [`TodoService`](crate::TodoService).
#[derive(thiserror::Error, Debug)]
pub enum TodoError {
    /// A batch operation received no items, or an item was blank.
    #[error("{what} required")]
    EmptyInput {
        /// What was missing, e.g. "task text".
        what: &'static str,
    },
    /// Index outside `[0, len)`.
    #[error("task index {index} out of bounds (list has {len} tasks)")]
    OutOfBounds {
        /// Rejected index.
        index: usize,
        /// List length at the time of the call.
        len: usize,
    },
    /// No task carries the requested line number.
    #[error("no task on line {0}")]
    NoSuchLineNumber(usize),
    /// `depri` on a task without priority.
    #[error("task on line {0} is not prioritized")]
    NotPrioritized(usize),
    /// The task source could not be read.
    #[error("failed to read tasks: {0}")]
    StorageRead(#[source] Error),
    /// The task source could not be written.
    #[error("failed to write tasks: {0}")]
    StorageWrite(#[source] Error),
    /// A command-line argument could not be coerced.
    #[error("invalid argument: {0}")]
    ParseArg(String),
}

impl TodoError {
    /// Stable machine-readable tag of the error kind.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::EmptyInput { .. } => "EmptyInput",
            Self::OutOfBounds { .. } => "OutOfBounds",
            Self::NoSuchLineNumber(_) => "NoSuchLineNumber",
            Self::NotPrioritized(_) => "NotPrioritized",
            Self::StorageRead(_) => "StorageRead",
            Self::StorageWrite(_) => "StorageWrite",
            Self::ParseArg(_) => "ParseArg",
        }
    }

    pub(crate) fn read(err: impl Into<Error>) -> Self {
        Self::StorageRead(err.into())
    }

    pub(crate) fn write(err: impl Into<Error>) -> Self {
        Self::StorageWrite(err.into())
    }
}

/// Translate a 1-based user line number into a 0-based index.
///
/// # Errors
/// Returns [`TodoError::ParseArg`] for line number `0`.
pub fn line_number_to_index(line_number: usize) -> TodoResult<usize> {
    line_number
        .checked_sub(1)
        .ok_or_else(|| TodoError::ParseArg("line numbers start at 1".to_owned()))
}
