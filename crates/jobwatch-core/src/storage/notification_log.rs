//! Append-only notification log (`Title: message` records).

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{data_dir, NOTIFICATION_LOG_FILE};
use crate::error::Result;

/// Text shown by readers when nothing has been logged yet.
pub const EMPTY_LOG_PLACEHOLDER: &str = "No notifications found.";

#[derive(Debug, Clone)]
pub struct NotificationLog {
    path: PathBuf,
}

impl NotificationLog {
    pub fn open() -> Result<Self> {
        Ok(Self::with_path(data_dir()?.join(NOTIFICATION_LOG_FILE)))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record. The record is written with a single `write_all`
    /// on an append-mode handle so concurrent readers never see half of it.
    pub fn append(&self, title: &str, message: &str) -> Result<()> {
        let record = format!("{title}: {message}\n");
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(record.as_bytes())?;
        Ok(())
    }

    /// Full log contents, or `None` when the log does not exist yet.
    pub fn read_all(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(c) => Ok(Some(c)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Log contents for display, with a placeholder for a missing log.
    pub fn read_for_display(&self) -> String {
        match self.read_all() {
            Ok(Some(content)) => content,
            Ok(None) => EMPTY_LOG_PLACEHOLDER.to_string(),
            Err(e) => format!("Failed to read {}: {e}", self.path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_records_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let log = NotificationLog::with_path(dir.path().join(NOTIFICATION_LOG_FILE));

        log.append("New Job Email", "first").unwrap();
        log.append("Joining Date Reminder", "line one\nline two").unwrap();

        assert_eq!(
            log.read_all().unwrap().unwrap(),
            "New Job Email: first\nJoining Date Reminder: line one\nline two\n"
        );
    }

    #[test]
    fn missing_log_shows_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let log = NotificationLog::with_path(dir.path().join(NOTIFICATION_LOG_FILE));

        assert!(log.read_all().unwrap().is_none());
        assert_eq!(log.read_for_display(), EMPTY_LOG_PLACEHOLDER);
    }
}
