use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use todotxt_store::FileStore;
use tracing::debug;

use crate::error::{TodoError, TodoResult};

/// Point-in-time task counts for the active and done sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Tasks in the active source.
    pub total: usize,
    /// Completed tasks still in the active source.
    pub done: usize,
    /// `total - done`.
    pub pending: usize,
    /// Tasks in the done source.
    pub archived: usize,
    /// Wall-clock time the counts were taken.
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
}

impl Report {
    /// Build a report, deriving `pending` from `total` and `done`.
    #[must_use]
    pub const fn new(total: usize, done: usize, archived: usize, generated_at: OffsetDateTime) -> Self {
        Self {
            total,
            done,
            pending: total.saturating_sub(done),
            archived,
            generated_at,
        }
    }

    /// Render as `"<rfc3339> <pending> <done> <archived>"`.
    ///
    /// # Errors
    /// Returns an error if the timestamp cannot be formatted as RFC 3339.
    pub fn to_log_line(&self) -> Result<String, time::error::Format> {
        Ok(format!(
            "{} {} {} {}",
            self.generated_at.format(&Rfc3339)?,
            self.pending,
            self.done,
            self.archived
        ))
    }

    /// Append [`to_log_line`](Self::to_log_line) to a report file.
    ///
    /// # Errors
    /// Returns [`TodoError::StorageWrite`] if formatting or the append fails.
    pub fn append_to(&self, log: &FileStore) -> TodoResult<()> {
        let line = self.to_log_line().map_err(TodoError::write)?;
        log.append_line(&line).map_err(TodoError::write)?;
        debug!(path = %log.path().display(), "Appended report line");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use time::macros::datetime;

    #[test]
    fn pending_is_total_minus_done() {
        let report = Report::new(5, 2, 7, OffsetDateTime::UNIX_EPOCH);
        assert_eq!(report.pending, 3);
    }

    #[test]
    fn log_line_is_timestamp_then_counts() {
        let report = Report::new(4, 1, 9, datetime!(2024-03-01 12:30:00 UTC));
        assert_eq!(
            report.to_log_line().expect("format"),
            "2024-03-01T12:30:00Z 3 1 9"
        );
    }

    #[test]
    fn append_to_accumulates_lines() {
        let dir = tempdir().expect("tempdir");
        let log = FileStore::new(dir.path().join("report.txt"));
        let report = Report::new(1, 0, 0, datetime!(2024-03-01 00:00:00 UTC));
        report.append_to(&log).expect("first append");
        report.append_to(&log).expect("second append");

        let contents = std::fs::read_to_string(log.path()).expect("read log");
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.lines().all(|line| line == "2024-03-01T00:00:00Z 1 0 0"));
    }
}
