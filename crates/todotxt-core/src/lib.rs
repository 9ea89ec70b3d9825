//! Domain types for todo.txt task lists: the line parser, the task model,
//! ordering and filtering.

/// Whole-file parse and serialize.
pub mod document;
/// Task filters.
pub mod filter;
/// Sort specifications.
pub mod ordering;
/// Line parser.
pub mod parser;
/// Priority letters.
pub mod priority;
/// Task record and its mutators.
pub mod task;

pub use document::{parse_document, serialize_document};
pub use filter::{DoneFilter, TaskFilter, TaskFilterBuilder};
pub use ordering::{SortField, SortOrder, SortSpec};
pub use parser::{flatten_newlines, parse};
pub use priority::{Priority, PriorityParseError};
pub use task::{Tag, Task};
