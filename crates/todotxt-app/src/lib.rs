//! Application layer for todo.txt task lists.
//!
//! The [`Repository`] owns a task list loaded through a [`TaskSource`];
//! [`TodoService`] composes repository primitives into the user-facing
//! commands. Configuration and reporting live alongside.

/// File locations from `config.toml`.
pub mod config;
pub mod error;
/// Task counts and the report log.
pub mod report;
pub mod repository;
/// User-facing operations.
pub mod service;
pub mod source;

pub use config::TodoConfig;
pub use error::{TodoError, TodoResult, line_number_to_index};
pub use report::Report;
pub use repository::Repository;
pub use service::{ListOutput, ReplaceOutput, TodoService};
pub use source::TaskSource;
