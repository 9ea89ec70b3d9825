//! Whole-file conversion between todo.txt contents and task lists.

use crate::parser;
use crate::task::Task;

/// Parse file contents into tasks, numbering them from 1 in source order.
///
/// Lines that are empty once the line terminator (`\n` or `\r\n`) is removed
/// are skipped. Whitespace-only lines are kept as tasks.
#[must_use]
pub fn parse_document(contents: &str) -> Vec<Task> {
    contents
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(index, line)| {
            let mut task = parser::parse(line);
            task.set_line_number(index + 1);
            task
        })
        .collect()
}

/// Serialize tasks one per line with a trailing newline. An empty list
/// serializes to an empty string.
#[must_use]
pub fn serialize_document(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return String::new();
    }
    let mut out = tasks.iter().map(Task::text).collect::<Vec<_>>().join("\n");
    out.push('\n');
    out
}
