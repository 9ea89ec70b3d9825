//! Read/write contract every task backend satisfies.

use std::sync::Arc;

use anyhow::Error;
use todotxt_core::Task;
use todotxt_store::{FileStore, MemoryStore, StoreError};

/// Minimal storage abstraction required by [`Repository`](crate::Repository).
pub trait TaskSource {
    /// Error type bubbled up from the backing store.
    type Error: Into<Error>;

    /// Read every task in source order, skipping empty lines.
    /// A source that does not exist yet reads as an empty list.
    ///
    /// # Errors
    /// Returns a store-specific error when the source cannot be read.
    fn read(&self) -> Result<Vec<Task>, Self::Error>;

    /// Replace the whole destination with `tasks`, one per line.
    ///
    /// # Errors
    /// Returns a store-specific error when the destination cannot be written.
    fn write(&self, tasks: &[Task]) -> Result<(), Self::Error>;
}

impl TaskSource for FileStore {
    type Error = StoreError;

    fn read(&self) -> Result<Vec<Task>, Self::Error> {
        self.read_tasks()
    }

    fn write(&self, tasks: &[Task]) -> Result<(), Self::Error> {
        self.write_tasks(tasks)
    }
}

impl TaskSource for MemoryStore {
    type Error = StoreError;

    fn read(&self) -> Result<Vec<Task>, Self::Error> {
        self.read_tasks()
    }

    fn write(&self, tasks: &[Task]) -> Result<(), Self::Error> {
        self.write_tasks(tasks)
    }
}

impl<S> TaskSource for &S
where
    S: TaskSource + ?Sized,
{
    type Error = S::Error;

    fn read(&self) -> Result<Vec<Task>, Self::Error> {
        (*self).read()
    }

    fn write(&self, tasks: &[Task]) -> Result<(), Self::Error> {
        (*self).write(tasks)
    }
}

impl<S> TaskSource for Arc<S>
where
    S: TaskSource + ?Sized,
{
    type Error = S::Error;

    fn read(&self) -> Result<Vec<Task>, Self::Error> {
        (**self).read()
    }

    fn write(&self, tasks: &[Task]) -> Result<(), Self::Error> {
        (**self).write(tasks)
    }
}
