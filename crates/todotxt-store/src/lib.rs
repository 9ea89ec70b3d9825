//! Storage backends for todo.txt task lists.
//!
//! [`FileStore`] reads and writes a file on disk, [`MemoryStore`] keeps the
//! same line-oriented contents in memory.

mod error;
mod file;
mod memory;

pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;
