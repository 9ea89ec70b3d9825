//! In-memory owner of a task list backed by a [`TaskSource`].

use std::collections::{BTreeSet, HashSet};

use todotxt_core::{Priority, SortSpec, Task, TaskFilter};
use tracing::debug;

use crate::error::{TodoError, TodoResult};
use crate::source::TaskSource;

/// Task list loaded from a source, mutated in memory and flushed by [`save`](Self::save).
///
/// All positional operations take 0-based indices. Line numbers are the
/// 1-based positions assigned on load and by [`sort`](Self::sort); removing a
/// task does not renumber the rest.
pub struct Repository<S> {
    source: S,
    tasks: Vec<Task>,
}

impl<S: TaskSource> Repository<S> {
    /// Read the source and build a repository over its tasks.
    ///
    /// # Errors
    /// Returns [`TodoError::StorageRead`] if the source cannot be read.
    pub fn load(source: S) -> TodoResult<Self> {
        let mut repo = Self {
            source,
            tasks: Vec::new(),
        };
        repo.reload()?;
        Ok(repo)
    }

    /// Discard in-memory changes and read the source again.
    ///
    /// # Errors
    /// Returns [`TodoError::StorageRead`] if the source cannot be read; the
    /// current list is left untouched in that case.
    pub fn reload(&mut self) -> TodoResult<()> {
        let mut tasks = self.source.read().map_err(TodoError::read)?;
        renumber(&mut tasks);
        debug!(tasks = tasks.len(), "Loaded task list");
        self.tasks = tasks;
        Ok(())
    }

    /// Write the full current list through the source.
    ///
    /// # Errors
    /// Returns [`TodoError::StorageWrite`] if the source rejects the write.
    pub fn save(&self) -> TodoResult<()> {
        self.source.write(&self.tasks).map_err(TodoError::write)?;
        debug!(tasks = self.tasks.len(), "Saved task list");
        Ok(())
    }

    /// Parse `text` and append it at the end of the list.
    pub fn add(&mut self, text: &str) -> &Task {
        let mut task = Task::parse(text);
        task.set_line_number(self.next_line_number());
        self.tasks.push(task);
        &self.tasks[self.tasks.len() - 1]
    }

    /// Borrow the task at `index`.
    ///
    /// # Errors
    /// Returns [`TodoError::OutOfBounds`] for an invalid index.
    pub fn get(&self, index: usize) -> TodoResult<&Task> {
        self.tasks.get(index).ok_or(TodoError::OutOfBounds {
            index,
            len: self.tasks.len(),
        })
    }

    /// Remove and return the task at `index`.
    ///
    /// # Errors
    /// Returns [`TodoError::OutOfBounds`] for an invalid index.
    pub fn remove(&mut self, index: usize) -> TodoResult<Task> {
        self.check_index(index)?;
        Ok(self.tasks.remove(index))
    }

    /// Replace the task at `index`. The replacement inherits the line number
    /// of the task it replaces.
    ///
    /// # Errors
    /// Returns [`TodoError::OutOfBounds`] for an invalid index.
    pub fn update(&mut self, index: usize, mut task: Task) -> TodoResult<&Task> {
        let slot = self.slot(index)?;
        task.set_line_number(slot.line_number());
        *slot = task;
        Ok(&*slot)
    }

    /// Flip the done marker of the task at `index`.
    ///
    /// # Errors
    /// Returns [`TodoError::OutOfBounds`] for an invalid index.
    pub fn toggle_done(&mut self, index: usize) -> TodoResult<&Task> {
        let slot = self.slot(index)?;
        slot.toggle_done();
        Ok(&*slot)
    }

    /// Set (`Some`) or clear (`None`) the priority of the task at `index`.
    ///
    /// # Errors
    /// Returns [`TodoError::OutOfBounds`] for an invalid index.
    pub fn set_priority(&mut self, index: usize, priority: Option<Priority>) -> TodoResult<&Task> {
        let slot = self.slot(index)?;
        slot.set_priority(priority);
        Ok(&*slot)
    }

    /// Tasks matching `filter`, in list order.
    #[must_use]
    pub fn filter(&self, filter: &TaskFilter) -> Vec<Task> {
        filter.apply(&self.tasks)
    }

    /// Sort in place and reassign every line number as `index + 1`.
    pub fn sort(&mut self, spec: SortSpec) {
        self.sort_tracked(spec);
    }

    /// Like [`sort`](Self::sort), also returning where each task went:
    /// entry `i` is the new index of the task previously at index `i`.
    pub fn sort_tracked(&mut self, spec: SortSpec) -> Vec<usize> {
        renumber(&mut self.tasks);
        spec.sort(&mut self.tasks);
        let mut moved_to = vec![0; self.tasks.len()];
        for (index, task) in self.tasks.iter().enumerate() {
            moved_to[task.line_number() - 1] = index;
        }
        renumber(&mut self.tasks);
        moved_to
    }

    /// Replace the in-memory list wholesale, e.g. with a copy taken before a
    /// failed save. Nothing is written.
    pub fn restore(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    /// The current list.
    #[must_use]
    pub fn list_all(&self) -> &[Task] {
        &self.tasks
    }

    /// Distinct `+project` tokens, ascending.
    #[must_use]
    pub fn list_projects(&self) -> Vec<String> {
        self.distinct(Task::projects)
    }

    /// Distinct `@context` tokens, ascending.
    #[must_use]
    pub fn list_contexts(&self) -> Vec<String> {
        self.distinct(Task::contexts)
    }

    /// Index of the task carrying `line_number`, if any.
    #[must_use]
    pub fn find_index_by_line_number(&self, line_number: usize) -> Option<usize> {
        self.tasks
            .iter()
            .position(|task| task.line_number() == line_number)
    }

    /// Fail with the first invalid index without touching the list.
    ///
    /// # Errors
    /// Returns [`TodoError::OutOfBounds`] for the first index outside the list.
    pub fn validate_indices(&self, indices: &[usize]) -> TodoResult<()> {
        indices.iter().try_for_each(|&index| self.check_index(index))
    }

    /// Remove every task matching `predicate` and return them in list order.
    pub fn drain_matching<F>(&mut self, mut predicate: F) -> Vec<Task>
    where
        F: FnMut(&Task) -> bool,
    {
        let (drained, kept): (Vec<Task>, Vec<Task>) = std::mem::take(&mut self.tasks)
            .into_iter()
            .partition(|task| predicate(task));
        self.tasks = kept;
        drained
    }

    /// Remove every task whose text already appeared earlier in the list and
    /// return the removed tasks in list order.
    pub fn remove_duplicates(&mut self) -> Vec<Task> {
        let mut seen = HashSet::new();
        let (kept, removed): (Vec<Task>, Vec<Task>) = std::mem::take(&mut self.tasks)
            .into_iter()
            .partition(|task| seen.insert(task.text().to_owned()));
        self.tasks = kept;
        removed
    }

    /// Number of tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Borrow the backing source.
    pub const fn source(&self) -> &S {
        &self.source
    }

    fn check_index(&self, index: usize) -> TodoResult<()> {
        self.get(index).map(|_| ())
    }

    fn slot(&mut self, index: usize) -> TodoResult<&mut Task> {
        let len = self.tasks.len();
        self.tasks
            .get_mut(index)
            .ok_or(TodoError::OutOfBounds { index, len })
    }

    fn next_line_number(&self) -> usize {
        self.tasks
            .iter()
            .map(Task::line_number)
            .max()
            .unwrap_or(0)
            + 1
    }

    fn distinct<'a, F>(&'a self, tokens: F) -> Vec<String>
    where
        F: Fn(&'a Task) -> &'a [String],
    {
        self.tasks
            .iter()
            .flat_map(tokens)
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

fn renumber(tasks: &mut [Task]) {
    for (index, task) in tasks.iter_mut().enumerate() {
        task.set_line_number(index + 1);
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use todotxt_core::{SortField, SortOrder, TaskFilterBuilder};
    use todotxt_store::MemoryStore;

    fn repo(lines: &[&str]) -> Repository<MemoryStore> {
        Repository::load(MemoryStore::with_lines(lines)).expect("load memory store")
    }

    fn texts<S: TaskSource>(repo: &Repository<S>) -> Vec<&str> {
        repo.list_all().iter().map(Task::text).collect()
    }

    fn priority(letter: char) -> Priority {
        Priority::new(letter).expect("valid letter")
    }

    #[test]
    fn load_numbers_tasks_from_one() {
        let repo = repo(&["a", "b", "c"]);
        let numbers: Vec<_> = repo.list_all().iter().map(Task::line_number).collect();
        assert_eq!(numbers, [1, 2, 3]);
    }

    #[test]
    fn add_appends_with_next_line_number() {
        let mut repo = repo(&["a", "b"]);
        let task = repo.add("c +proj");
        assert_eq!(task.line_number(), 3);
        assert_eq!(task.projects(), ["+proj"]);
        assert_eq!(texts(&repo), ["a", "b", "c +proj"]);
    }

    #[test]
    fn add_after_remove_does_not_reuse_line_numbers() {
        let mut repo = repo(&["a", "b", "c"]);
        repo.remove(1).expect("remove");
        assert_eq!(repo.add("d").line_number(), 4);
        assert_eq!(repo.find_index_by_line_number(2), None);
        assert_eq!(repo.find_index_by_line_number(3), Some(1));
    }

    #[test]
    fn add_then_remove_restores_the_list() {
        let mut repo = repo(&["a", "b"]);
        let before = repo.list_all().to_vec();
        repo.add("temporary");
        let index = repo.len() - 1;
        repo.remove(index).expect("remove added task");
        assert_eq!(repo.list_all(), before.as_slice());
    }

    #[test]
    fn positional_operations_reject_out_of_bounds() {
        let mut repo = repo(&["a"]);
        assert!(matches!(repo.get(1), Err(TodoError::OutOfBounds { index: 1, len: 1 })));
        assert!(repo.remove(5).is_err());
        assert!(repo.update(1, Task::parse("b")).is_err());
        assert!(repo.toggle_done(1).is_err());
        assert!(repo.set_priority(1, None).is_err());
        assert_eq!(texts(&repo), ["a"]);
    }

    #[test]
    fn update_keeps_line_number() {
        let mut repo = repo(&["a", "b"]);
        let updated = repo.update(1, Task::parse("b2 @ctx")).expect("update");
        assert_eq!(updated.line_number(), 2);
        assert_eq!(updated.contexts(), ["@ctx"]);
    }

    #[test]
    fn toggle_and_priority_mutate_in_place() {
        let mut repo = repo(&["task"]);
        assert!(repo.toggle_done(0).expect("toggle").is_done());
        let task = repo.set_priority(0, Some(priority('A'))).expect("priority");
        assert_eq!(task.text(), "x (A) task");
    }

    #[test]
    fn sort_reassigns_line_numbers() {
        let mut repo = repo(&["x done", "b", "a"]);
        repo.sort(SortSpec::default());
        assert_eq!(texts(&repo), ["a", "b", "x done"]);
        let numbers: Vec<_> = repo.list_all().iter().map(Task::line_number).collect();
        assert_eq!(numbers, [1, 2, 3]);

        repo.sort(SortSpec::new(SortField::Text, SortOrder::Descending));
        assert_eq!(texts(&repo), ["x done", "b", "a"]);
    }

    #[test]
    fn filter_is_stable() {
        let repo = repo(&["one +p", "two", "three +p"]);
        let filter = TaskFilterBuilder::new().project("+p").build();
        let filtered: Vec<_> = repo.filter(&filter).into_iter().map(|t| t.line_number()).collect();
        assert_eq!(filtered, [1, 3]);
    }

    #[test]
    fn projects_and_contexts_are_distinct_and_sorted() {
        let repo = repo(&["a +zeta @home", "b +alpha @work +zeta", "c @home"]);
        assert_eq!(repo.list_projects(), ["+alpha", "+zeta"]);
        assert_eq!(repo.list_contexts(), ["@home", "@work"]);
    }

    #[test]
    fn validate_indices_reports_first_invalid() {
        let repo = repo(&["a", "b"]);
        assert!(repo.validate_indices(&[0, 1]).is_ok());
        assert!(matches!(
            repo.validate_indices(&[0, 7, 9]),
            Err(TodoError::OutOfBounds { index: 7, .. })
        ));
    }

    #[test]
    fn drain_matching_splits_in_order() {
        let mut repo = repo(&["a", "x b", "c", "x d"]);
        let drained = repo.drain_matching(Task::is_done);
        let drained: Vec<_> = drained.iter().map(Task::text).collect();
        assert_eq!(drained, ["x b", "x d"]);
        assert_eq!(texts(&repo), ["a", "c"]);
    }

    #[test]
    fn sort_tracked_maps_old_positions_to_new() {
        let mut repo = repo(&["x c", "b", "a"]);
        let moved_to = repo.sort_tracked(SortSpec::default());
        assert_eq!(moved_to, [2, 1, 0]);
        assert_eq!(texts(&repo), ["a", "b", "x c"]);
    }

    #[test]
    fn remove_duplicates_keeps_the_earliest_line() {
        let mut repo = repo(&["a", "b", "a", "c", "b"]);
        let removed: Vec<_> = repo.remove_duplicates().iter().map(Task::line_number).collect();
        assert_eq!(removed, [3, 5]);
        let kept: Vec<_> = repo
            .list_all()
            .iter()
            .map(|task| (task.line_number(), task.text()))
            .collect();
        assert_eq!(kept, [(1, "a"), (2, "b"), (4, "c")]);
    }

    #[test]
    fn restore_replaces_the_list_without_saving() {
        let mut repo = repo(&["a"]);
        let before = repo.list_all().to_vec();
        repo.add("b");
        repo.restore(before);
        assert_eq!(texts(&repo), ["a"]);
        assert_eq!(repo.source().contents().expect("contents"), "a\n");
    }

    #[test]
    fn save_writes_full_list() {
        let mut repo = repo(&["b", "a"]);
        repo.add("c");
        repo.save().expect("save");
        assert_eq!(repo.source().contents().expect("contents"), "b\na\nc\n");
    }

    #[test]
    fn reload_discards_unsaved_changes() {
        let mut repo = repo(&["a"]);
        repo.add("b");
        repo.reload().expect("reload");
        assert_eq!(texts(&repo), ["a"]);
    }
}
