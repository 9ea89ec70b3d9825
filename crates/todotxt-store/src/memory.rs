use std::sync::{Mutex, MutexGuard};

use todotxt_core::{Task, parse_document, serialize_document};

use crate::error::StoreError;

/// Task source backed by an in-memory buffer holding todo.txt contents.
#[derive(Debug, Default)]
pub struct MemoryStore {
    buffer: Mutex<String>,
}

impl MemoryStore {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer pre-filled with raw file contents.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            buffer: Mutex::new(contents.into()),
        }
    }

    /// Create a buffer holding the given lines, one task per line.
    #[must_use]
    pub fn with_lines(lines: &[&str]) -> Self {
        let tasks: Vec<Task> = lines.iter().map(|line| Task::parse(line)).collect();
        Self::with_contents(serialize_document(&tasks))
    }

    /// Current raw contents.
    ///
    /// # Errors
    /// Returns [`StoreError::LockPoisoned`] if a writer panicked.
    pub fn contents(&self) -> Result<String, StoreError> {
        Ok(self.lock()?.clone())
    }

    /// Parse the buffer into tasks.
    ///
    /// # Errors
    /// Returns [`StoreError::LockPoisoned`] if a writer panicked.
    pub fn read_tasks(&self) -> Result<Vec<Task>, StoreError> {
        Ok(parse_document(&self.lock()?))
    }

    /// Replace the buffer with the serialized tasks.
    ///
    /// # Errors
    /// Returns [`StoreError::LockPoisoned`] if a writer panicked.
    pub fn write_tasks(&self, tasks: &[Task]) -> Result<(), StoreError> {
        *self.lock()? = serialize_document(tasks);
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, String>, StoreError> {
        self.buffer.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_the_buffer() -> Result<(), StoreError> {
        let store = MemoryStore::with_lines(&["task one", "x task two"]);
        let tasks = store.read_tasks()?;
        assert_eq!(tasks.len(), 2);
        assert!(tasks[1].is_done());

        store.write_tasks(&tasks[..1])?;
        assert_eq!(store.contents()?, "task one\n");
        Ok(())
    }

    #[test]
    fn empty_buffer_reads_empty_and_writes_empty() -> Result<(), StoreError> {
        let store = MemoryStore::new();
        assert!(store.read_tasks()?.is_empty());
        store.write_tasks(&[])?;
        assert_eq!(store.contents()?, "");
        Ok(())
    }
}
