use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use todotxt_core::{Task, parse_document, serialize_document};
use tracing::debug;

use crate::error::StoreError;

/// Task source backed by a todo.txt file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store for `path`. The file does not need to exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every task in file order. A missing file reads as an empty list.
    ///
    /// # Errors
    /// Returns [`StoreError::Read`] when the file exists but cannot be read.
    pub fn read_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "todo file missing, starting empty");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        let tasks = parse_document(&contents);
        debug!(path = %self.path.display(), tasks = tasks.len(), "Read todo file");
        Ok(tasks)
    }

    /// Replace the file contents with `tasks`.
    ///
    /// The new contents are written to a temporary file next to the target and
    /// renamed over it, so readers never observe a partially written list.
    ///
    /// # Errors
    /// Returns [`StoreError::Write`] when the temporary file cannot be created,
    /// written, or moved into place.
    pub fn write_tasks(&self, tasks: &[Task]) -> Result<(), StoreError> {
        self.replace_contents(serialize_document(tasks).as_bytes())
            .map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })?;
        debug!(path = %self.path.display(), tasks = tasks.len(), "Wrote todo file");
        Ok(())
    }

    /// Append a single raw line (plus newline) to the file, creating it if needed.
    ///
    /// # Errors
    /// Returns [`StoreError::Write`] when the file cannot be opened or written.
    pub fn append_line(&self, line: &str) -> Result<(), StoreError> {
        let to_write_error = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        self.ensure_parent_dir().map_err(to_write_error)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(to_write_error)?;
        writeln!(file, "{line}").map_err(to_write_error)?;
        debug!(path = %self.path.display(), "Appended line");
        Ok(())
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn ensure_parent_dir(&self) -> io::Result<()> {
        fs::create_dir_all(self.parent_dir())
    }

    fn replace_contents(&self, bytes: &[u8]) -> io::Result<()> {
        self.ensure_parent_dir()?;
        let mut temp = NamedTempFile::new_in(self.parent_dir())?;
        temp.write_all(bytes)?;
        temp.as_file().sync_all()?;
        if let Ok(metadata) = fs::metadata(&self.path) {
            temp.as_file().set_permissions(metadata.permissions())?;
        }
        temp.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }
}
