//! Error types for todo.txt storage backends.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or writing a task source.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading the backing file failed.
    #[error("failed to read {path}: {source}")]
    Read {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Writing the backing file failed.
    #[error("failed to write {path}: {source}")]
    Write {
        /// File that could not be written.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// In-memory buffer lock was poisoned.
    #[error("buffer lock poisoned")]
    LockPoisoned,
}
