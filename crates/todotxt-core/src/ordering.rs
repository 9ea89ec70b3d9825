use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::task::Task;

/// Field a task list can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    /// Raw line text, byte-wise.
    #[default]
    Text,
    /// Priority letter (`A` first, unprioritized last), then text.
    Priority,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Smallest first; incomplete tasks before completed ones.
    #[default]
    Ascending,
    /// Largest first; completed tasks before incomplete ones.
    Descending,
}

/// Sort specification. The default is text ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortSpec {
    /// Field to compare.
    pub field: SortField,
    /// Direction.
    pub order: SortOrder,
}

impl SortSpec {
    /// Create a sort specification.
    #[must_use]
    pub const fn new(field: SortField, order: SortOrder) -> Self {
        Self { field, order }
    }

    /// Total order over tasks. Completion state always splits the list first,
    /// so completed tasks trail when ascending and lead when descending.
    #[must_use]
    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        let ascending = a
            .is_done()
            .cmp(&b.is_done())
            .then_with(|| match self.field {
                SortField::Text => compare_text(a, b),
                SortField::Priority => compare_priority(a, b).then_with(|| compare_text(a, b)),
            });
        match self.order {
            SortOrder::Ascending => ascending,
            SortOrder::Descending => ascending.reverse(),
        }
    }

    /// Sort `tasks` in place. The sort is stable, so equal tasks keep their
    /// relative order.
    pub fn sort(&self, tasks: &mut [Task]) {
        tasks.sort_by(|a, b| self.compare(a, b));
    }
}

fn compare_text(a: &Task, b: &Task) -> Ordering {
    a.text().as_bytes().cmp(b.text().as_bytes())
}

fn compare_priority(a: &Task, b: &Task) -> Ordering {
    match (a.priority(), b.priority()) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Priority => "priority",
        })
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "priority" | "pri" => Ok(Self::Priority),
            other => Err(format!("unknown sort field: {other}")),
        }
    }
}
