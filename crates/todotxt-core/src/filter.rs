use std::str::FromStr;

use serde::Serialize;

use crate::priority::Priority;
use crate::task::Task;

/// Tri-state completion criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DoneFilter {
    /// Completion state is ignored.
    #[default]
    DontCare,
    /// Only completed tasks.
    Include,
    /// Only incomplete tasks.
    Exclude,
}

impl DoneFilter {
    /// Whether a task with the given completion state passes.
    #[must_use]
    pub const fn accepts(self, done: bool) -> bool {
        match self {
            Self::DontCare => true,
            Self::Include => done,
            Self::Exclude => !done,
        }
    }
}

impl FromStr for DoneFilter {
    type Err = String;

    /// Accepts the legacy string forms `"true"`, `"false"` and `""`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Ok(Self::DontCare),
            "true" => Ok(Self::Include),
            "false" => Ok(Self::Exclude),
            other => Err(format!("invalid done filter: {other}")),
        }
    }
}

/// Conjunctive filter over tasks. Unset criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskFilter {
    /// Completion criterion.
    pub done: DoneFilter,
    /// Exact priority letter.
    pub priority: Option<Priority>,
    /// `+project` token that must appear among the task's projects.
    pub project: Option<String>,
    /// `@context` token that must appear among the task's contexts.
    pub context: Option<String>,
    /// Case-sensitive substring of the raw text.
    pub text: Option<String>,
}

impl TaskFilter {
    /// Returns true when no criterion is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.done == DoneFilter::DontCare
            && self.priority.is_none()
            && self.project.is_none()
            && self.context.is_none()
            && self.text.is_none()
    }

    /// Evaluate every criterion against `task`.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.done.accepts(task.is_done())
            && self.priority.is_none_or(|wanted| task.priority() == Some(wanted))
            && self
                .project
                .as_ref()
                .is_none_or(|wanted| task.projects().contains(wanted))
            && self
                .context
                .as_ref()
                .is_none_or(|wanted| task.contexts().contains(wanted))
            && self
                .text
                .as_deref()
                .is_none_or(|needle| task.text().contains(needle))
    }

    /// Keep the matching tasks, preserving their relative order.
    #[must_use]
    pub fn apply<'a, I>(&self, tasks: I) -> Vec<Task>
    where
        I: IntoIterator<Item = &'a Task>,
    {
        tasks
            .into_iter()
            .filter(|task| self.matches(task))
            .cloned()
            .collect()
    }
}

/// Builder that normalizes user-facing inputs into a [`TaskFilter`].
#[derive(Debug, Clone, Default)]
pub struct TaskFilterBuilder {
    filter: TaskFilter,
}

impl TaskFilterBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the completion criterion.
    #[must_use]
    pub const fn done(mut self, done: DoneFilter) -> Self {
        self.filter.done = done;
        self
    }

    /// Require an exact priority.
    #[must_use]
    pub const fn priority(mut self, priority: Option<Priority>) -> Self {
        self.filter.priority = priority;
        self
    }

    /// Require a project; a missing `+` is added and blank input is ignored.
    #[must_use]
    pub fn project(mut self, project: impl AsRef<str>) -> Self {
        self.filter.project = normalize_token(project.as_ref(), '+');
        self
    }

    /// Require a context; a missing `@` is added and blank input is ignored.
    #[must_use]
    pub fn context(mut self, context: impl AsRef<str>) -> Self {
        self.filter.context = normalize_token(context.as_ref(), '@');
        self
    }

    /// Require a substring. Empty input is ignored; whitespace is significant.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.filter.text = (!text.is_empty()).then_some(text);
        self
    }

    /// Build the final filter.
    #[must_use]
    pub fn build(self) -> TaskFilter {
        self.filter
    }
}

fn normalize_token(raw: &str, sigil: char) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with(sigil) {
        Some(trimmed.to_owned())
    } else {
        Some(format!("{sigil}{trimmed}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tasks(lines: &[&str]) -> Vec<Task> {
        lines.iter().map(|line| Task::parse(line)).collect()
    }

    fn texts(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(Task::text).collect()
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let list = tasks(&["a", "x b", "(A) c"]);
        let filter = TaskFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&list), list);
    }

    #[test]
    fn done_filter_parses_legacy_strings() {
        assert_eq!("true".parse::<DoneFilter>(), Ok(DoneFilter::Include));
        assert_eq!("false".parse::<DoneFilter>(), Ok(DoneFilter::Exclude));
        assert_eq!("".parse::<DoneFilter>(), Ok(DoneFilter::DontCare));
        assert!("maybe".parse::<DoneFilter>().is_err());
    }

    #[test]
    fn criteria_combine_by_conjunction() {
        let list = tasks(&[
            "(A) call +Family @phone",
            "(A) email +Work @computer",
            "x (A) call +Family @phone",
            "(B) call +Family @phone",
        ]);
        let filter = TaskFilterBuilder::new()
            .done(DoneFilter::Exclude)
            .priority("A".parse().ok())
            .project("Family")
            .context("@phone")
            .text("call")
            .build();
        assert_eq!(texts(&filter.apply(&list)), ["(A) call +Family @phone"]);
    }

    #[test]
    fn project_match_is_exact_not_substring() {
        let list = tasks(&["work on +Gardening", "plan +Garden"]);
        let filter = TaskFilterBuilder::new().project("+Garden").build();
        assert_eq!(texts(&filter.apply(&list)), ["plan +Garden"]);
    }

    #[test]
    fn text_match_is_case_sensitive() {
        let list = tasks(&["Task one", "task two"]);
        let filter = TaskFilterBuilder::new().text("task").build();
        assert_eq!(texts(&filter.apply(&list)), ["task two"]);
    }

    #[test]
    fn blank_builder_inputs_are_ignored() {
        let filter = TaskFilterBuilder::new().project("  ").context("").text("").build();
        assert!(filter.is_empty());
    }
}
