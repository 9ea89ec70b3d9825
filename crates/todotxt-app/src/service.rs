use serde::Serialize;
use time::OffsetDateTime;
use todotxt_core::parser::{DONE_MARKER, split_done};
use todotxt_core::{DoneFilter, Priority, SortSpec, Task, TaskFilterBuilder, flatten_newlines};
use tracing::{info, warn};

use crate::error::{TodoError, TodoResult};
use crate::report::Report;
use crate::repository::Repository;
use crate::source::TaskSource;

/// Service façade turning user commands into repository mutations.
///
/// Every mutating operation validates its whole input before touching the
/// list and saves at its end. A failed save puts the in-memory list back the
/// way it was before the operation.
pub struct TodoService<S> {
    repo: Repository<S>,
}

impl<S> TodoService<S> {
    /// Wrap an already loaded repository.
    pub const fn new(repo: Repository<S>) -> Self {
        Self { repo }
    }

    /// Borrow the underlying repository.
    pub const fn repository(&self) -> &Repository<S> {
        &self.repo
    }

    /// Mutably borrow the underlying repository.
    pub const fn repository_mut(&mut self) -> &mut Repository<S> {
        &mut self.repo
    }
}

impl<S: TaskSource> TodoService<S> {
    /// Load `source` into a fresh service.
    ///
    /// # Errors
    /// Returns [`TodoError::StorageRead`] if the source cannot be read.
    pub fn load(source: S) -> TodoResult<Self> {
        Repository::load(source).map(Self::new)
    }

    /// Add one task per input, flattening newlines and trimming each text.
    /// The list is sorted and saved afterwards.
    ///
    /// # Errors
    /// [`TodoError::EmptyInput`] when `texts` is empty or any text is blank;
    /// storage errors from the save.
    pub fn add<T: AsRef<str>>(&mut self, texts: &[T]) -> TodoResult<Vec<Task>> {
        if texts.is_empty() {
            return Err(TodoError::EmptyInput { what: "task text" });
        }
        let texts = texts
            .iter()
            .map(|text| clean_text(text.as_ref(), "task text"))
            .collect::<TodoResult<Vec<_>>>()?;

        let snapshot = self.repo.list_all().to_vec();
        let first = self.repo.len();
        for text in &texts {
            self.repo.add(text);
        }
        let moved_to = self.repo.sort_tracked(SortSpec::default());
        self.commit(snapshot)?;
        info!(count = texts.len(), "Added tasks");
        let tasks = self.repo.list_all();
        Ok(moved_to[first..].iter().map(|&index| tasks[index].clone()).collect())
    }

    /// Add one task per non-blank line of `text`.
    ///
    /// # Errors
    /// [`TodoError::EmptyInput`] when no line carries text; storage errors.
    pub fn add_multiline(&mut self, text: &str) -> TodoResult<Vec<Task>> {
        let lines: Vec<&str> = text
            .split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        self.add(lines.as_slice())
    }

    /// Toggle the done marker of each index in input order, then sort and save.
    /// Returns one task per toggle, in input order, carrying its final line number.
    ///
    /// # Errors
    /// [`TodoError::EmptyInput`] for an empty batch, [`TodoError::OutOfBounds`]
    /// for the first invalid index (nothing is toggled), storage errors.
    pub fn toggle_done(&mut self, indices: &[usize]) -> TodoResult<Vec<Task>> {
        if indices.is_empty() {
            return Err(TodoError::EmptyInput { what: "task index" });
        }
        self.repo.validate_indices(indices)?;

        let snapshot = self.repo.list_all().to_vec();
        let mut toggled = Vec::with_capacity(indices.len());
        for &index in indices {
            toggled.push((index, self.repo.toggle_done(index)?.clone()));
        }
        let moved_to = self.repo.sort_tracked(SortSpec::default());
        self.commit(snapshot)?;
        info!(count = indices.len(), "Toggled tasks");
        Ok(toggled
            .into_iter()
            .map(|(index, mut task)| {
                task.set_line_number(moved_to[index] + 1);
                task
            })
            .collect())
    }

    /// Set `priority` on every index. The list keeps its order.
    ///
    /// # Errors
    /// [`TodoError::EmptyInput`] for an empty batch, [`TodoError::OutOfBounds`]
    /// before any change, storage errors.
    pub fn set_priority(&mut self, indices: &[usize], priority: Priority) -> TodoResult<Vec<Task>> {
        if indices.is_empty() {
            return Err(TodoError::EmptyInput { what: "task index" });
        }
        self.repo.validate_indices(indices)?;

        let snapshot = self.repo.list_all().to_vec();
        let mut updated = Vec::with_capacity(indices.len());
        for &index in indices {
            updated.push(self.repo.set_priority(index, Some(priority))?.clone());
        }
        self.commit(snapshot)?;
        info!(count = indices.len(), %priority, "Prioritized tasks");
        Ok(updated)
    }

    /// Clear the priority of the task at `index`.
    ///
    /// # Errors
    /// [`TodoError::NotPrioritized`] when the task has no priority,
    /// [`TodoError::OutOfBounds`], storage errors.
    pub fn remove_priority(&mut self, index: usize) -> TodoResult<Task> {
        let task = self.repo.get(index)?;
        if task.priority().is_none() {
            return Err(TodoError::NotPrioritized(task.line_number()));
        }
        let snapshot = self.repo.list_all().to_vec();
        let task = self.repo.set_priority(index, None)?.clone();
        self.commit(snapshot)?;
        info!(line = task.line_number(), "Removed priority");
        Ok(task)
    }

    /// Append `text` after a single separating space.
    ///
    /// # Errors
    /// [`TodoError::EmptyInput`] for blank text, [`TodoError::OutOfBounds`],
    /// storage errors.
    pub fn append(&mut self, index: usize, text: &str) -> TodoResult<Task> {
        let text = clean_text(text, "text to append")?;
        let current = self.repo.get(index)?.text();
        let combined = format!("{current} {text}");
        self.rewrite(index, &combined, "Appended to task")
    }

    /// Insert `text` at the front of the task body. A leading done marker
    /// and `(P) ` prefix stay in front.
    ///
    /// # Errors
    /// [`TodoError::EmptyInput`] for blank text, [`TodoError::OutOfBounds`],
    /// storage errors.
    pub fn prepend(&mut self, index: usize, text: &str) -> TodoResult<Task> {
        let text = clean_text(text, "text to prepend")?;
        let current = self.repo.get(index)?.text();

        let (done, body) = split_done(current);
        let (priority, rest) = Priority::split_prefix(body);
        let mut combined = String::with_capacity(current.len() + text.len() + 1);
        if done {
            combined.push_str(DONE_MARKER);
        }
        if let Some(priority) = priority {
            combined.push_str(&priority.prefix());
        }
        combined.push_str(&text);
        combined.push(' ');
        combined.push_str(rest);

        self.rewrite(index, &combined, "Prepended to task")
    }

    /// Replace the whole text of the task at `index`, keeping its line number.
    ///
    /// # Errors
    /// [`TodoError::EmptyInput`] for blank text, [`TodoError::OutOfBounds`],
    /// storage errors.
    pub fn replace(&mut self, index: usize, text: &str) -> TodoResult<ReplaceOutput> {
        let text = clean_text(text, "replacement text")?;
        let previous = self.repo.get(index)?.clone();
        let current = self.rewrite(index, &text, "Replaced task")?;
        Ok(ReplaceOutput { previous, current })
    }

    /// Delete every index. Duplicates are collapsed and removal runs from the
    /// highest index down. Returns the removed tasks in list order.
    ///
    /// # Errors
    /// [`TodoError::EmptyInput`] for an empty batch, [`TodoError::OutOfBounds`]
    /// before any change, storage errors.
    pub fn delete(&mut self, indices: &[usize]) -> TodoResult<Vec<Task>> {
        if indices.is_empty() {
            return Err(TodoError::EmptyInput { what: "task index" });
        }
        self.repo.validate_indices(indices)?;

        let snapshot = self.repo.list_all().to_vec();
        let mut ordered = indices.to_vec();
        ordered.sort_unstable_by(|a, b| b.cmp(a));
        ordered.dedup();

        let mut removed = ordered
            .into_iter()
            .map(|index| self.repo.remove(index))
            .collect::<TodoResult<Vec<_>>>()?;
        removed.reverse();
        self.commit(snapshot)?;
        info!(count = removed.len(), "Deleted tasks");
        Ok(removed)
    }

    /// Tasks whose text contains `substring`; everything when it is empty.
    #[must_use]
    pub fn list(&self, substring: &str) -> ListOutput {
        let tasks = if substring.is_empty() {
            self.repo.list_all().to_vec()
        } else {
            self.repo.filter(&TaskFilterBuilder::new().text(substring).build())
        };
        ListOutput {
            total: self.repo.len(),
            shown: tasks.len(),
            tasks,
        }
    }

    /// Every task in the active list.
    #[must_use]
    pub fn list_all(&self) -> Vec<Task> {
        self.repo.list_all().to_vec()
    }

    /// Active tasks followed by the tasks of `done_source`. Archived tasks
    /// carry line number `0`.
    ///
    /// # Errors
    /// [`TodoError::StorageRead`] if the done source cannot be read.
    pub fn list_all_with_done<D: TaskSource>(&self, done_source: &D) -> TodoResult<Vec<Task>> {
        let mut archived = done_source.read().map_err(TodoError::read)?;
        for task in &mut archived {
            task.set_line_number(0);
        }
        let mut tasks = self.list_all();
        tasks.append(&mut archived);
        Ok(tasks)
    }

    /// Incomplete tasks with the given priority, or with any priority for `None`.
    #[must_use]
    pub fn list_priority(&self, priority: Option<Priority>) -> Vec<Task> {
        let filter = TaskFilterBuilder::new()
            .done(DoneFilter::Exclude)
            .priority(priority)
            .build();
        let mut tasks = self.repo.filter(&filter);
        tasks.retain(|task| task.priority().is_some());
        tasks
    }

    /// Distinct projects, ascending.
    #[must_use]
    pub fn list_projects(&self) -> Vec<String> {
        self.repo.list_projects()
    }

    /// Distinct contexts, ascending.
    #[must_use]
    pub fn list_contexts(&self) -> Vec<String> {
        self.repo.list_contexts()
    }

    /// Move the task on `line_number` to `dest`.
    ///
    /// The destination is saved first so a failure can at worst duplicate the
    /// task, never lose it. The two saves are not atomic as a pair: when only
    /// the source save fails, the task stays in both files.
    ///
    /// # Errors
    /// [`TodoError::NoSuchLineNumber`] when no task carries `line_number`;
    /// storage errors from either save.
    pub fn move_to<D: TaskSource>(
        &mut self,
        dest: &mut TodoService<D>,
        line_number: usize,
    ) -> TodoResult<Task> {
        let index = self
            .repo
            .find_index_by_line_number(line_number)
            .ok_or(TodoError::NoSuchLineNumber(line_number))?;
        let text = self.repo.get(index)?.text().to_owned();

        let dest_snapshot = dest.repo.list_all().to_vec();
        let moved = dest.repo.add(&text).clone();
        dest.commit(dest_snapshot)?;

        let snapshot = self.repo.list_all().to_vec();
        self.repo.remove(index)?;
        if let Err(err) = self.commit(snapshot) {
            warn!(line = line_number, error = %err, "Task copied to destination but source was not saved");
            return Err(err);
        }
        info!(line = line_number, "Moved task");
        Ok(moved)
    }

    /// Move every done task to `done_source`, appending after its existing
    /// contents. Returns the archived tasks in list order.
    ///
    /// The done source is written before the active list is saved.
    ///
    /// # Errors
    /// Storage errors from either source.
    pub fn archive<D: TaskSource>(&mut self, done_source: &D) -> TodoResult<Vec<Task>> {
        let finished = self.repo.filter(&TaskFilterBuilder::new().done(DoneFilter::Include).build());
        if finished.is_empty() {
            return Ok(finished);
        }

        let mut combined = done_source.read().map_err(TodoError::read)?;
        combined.extend(finished.iter().cloned());
        done_source.write(&combined).map_err(TodoError::write)?;

        let snapshot = self.repo.list_all().to_vec();
        let archived = self.repo.drain_matching(Task::is_done);
        self.commit(snapshot)?;
        info!(count = archived.len(), "Archived done tasks");
        Ok(archived)
    }

    /// Drop repeated texts, keeping each first occurrence, then sort and save.
    /// Returns how many tasks were removed.
    ///
    /// # Errors
    /// Storage errors from the save.
    pub fn deduplicate(&mut self) -> TodoResult<usize> {
        let snapshot = self.repo.list_all().to_vec();
        let removed = self.repo.remove_duplicates().len();
        self.repo.sort(SortSpec::default());
        self.commit(snapshot)?;
        info!(count = removed, "Removed duplicate tasks");
        Ok(removed)
    }

    /// Remove every done task without archiving, then sort and save.
    ///
    /// # Errors
    /// Storage errors from the save.
    pub fn tidy(&mut self) -> TodoResult<usize> {
        let snapshot = self.repo.list_all().to_vec();
        let removed = self.repo.drain_matching(Task::is_done).len();
        self.repo.sort(SortSpec::default());
        self.commit(snapshot)?;
        info!(count = removed, "Removed done tasks");
        Ok(removed)
    }

    /// Count active, done and archived tasks. Nothing is written.
    ///
    /// # Errors
    /// [`TodoError::StorageRead`] if the done source cannot be read.
    pub fn report<D: TaskSource>(&self, done_source: &D) -> TodoResult<Report> {
        let archived = done_source.read().map_err(TodoError::read)?.len();
        let done = self.repo.list_all().iter().filter(|task| task.is_done()).count();
        Ok(Report::new(
            self.repo.len(),
            done,
            archived,
            OffsetDateTime::now_utc(),
        ))
    }

    fn rewrite(&mut self, index: usize, text: &str, action: &'static str) -> TodoResult<Task> {
        let snapshot = self.repo.list_all().to_vec();
        let task = self.repo.update(index, Task::parse(text))?.clone();
        self.commit(snapshot)?;
        info!(line = task.line_number(), "{action}");
        Ok(task)
    }

    /// Save, or put `snapshot` back when the save fails.
    fn commit(&mut self, snapshot: Vec<Task>) -> TodoResult<()> {
        self.repo.save().inspect_err(|_| self.repo.restore(snapshot))
    }
}

/// Result of [`TodoService::list`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListOutput {
    /// Matching tasks in list order.
    pub tasks: Vec<Task>,
    /// Size of the whole list.
    pub total: usize,
    /// Number of matching tasks.
    pub shown: usize,
}

/// Result of [`TodoService::replace`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplaceOutput {
    /// Task before the edit.
    pub previous: Task,
    /// Task after the edit.
    pub current: Task,
}

fn clean_text(text: &str, what: &'static str) -> TodoResult<String> {
    let flattened = flatten_newlines(text);
    let trimmed = flattened.trim();
    if trimmed.is_empty() {
        return Err(TodoError::EmptyInput { what });
    }
    Ok(trimmed.to_owned())
}
