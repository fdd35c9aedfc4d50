//! Persisted list of pending reminders.
//!
//! Stored as a JSON array of `{"date": "YYYY-MM-DD", "message": "..."}`.
//! The list is unordered and carries no uniqueness constraint.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{atomic_write, data_dir, REMINDERS_FILE};
use crate::error::{Result, StorageError};

/// A reminder due on `date`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduledReminder {
    #[serde(with = "ymd")]
    pub date: NaiveDate,
    pub message: String,
}

impl ScheduledReminder {
    pub fn new(date: NaiveDate, message: impl Into<String>) -> Self {
        Self {
            date,
            message: message.into(),
        }
    }

    /// True when the reminder should fire on `today`.
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.date <= today
    }
}

mod ymd {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDate::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Flat-file store for [`ScheduledReminder`]s.
#[derive(Debug, Clone)]
pub struct ReminderStore {
    path: PathBuf,
}

impl ReminderStore {
    /// Open the store in the default data directory.
    pub fn open() -> Result<Self> {
        Ok(Self::with_path(data_dir()?.join(REMINDERS_FILE)))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all reminders. A missing file is an empty list.
    pub fn load_all(&self) -> Result<Vec<ScheduledReminder>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            StorageError::Corrupt {
                path: self.path.clone(),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Replace the whole list on disk.
    pub fn save_all(&self, reminders: &[ScheduledReminder]) -> Result<()> {
        let content = serde_json::to_vec(reminders)?;
        atomic_write(&self.path, &content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReminderStore::with_path(dir.path().join(REMINDERS_FILE));
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn roundtrip_preserves_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReminderStore::with_path(dir.path().join(REMINDERS_FILE));

        let reminders = vec![
            ScheduledReminder::new(date(2025, 2, 22), "week"),
            ScheduledReminder::new(date(2025, 2, 28), "day"),
            ScheduledReminder::new(date(2025, 2, 28), "day"),
        ];
        store.save_all(&reminders).unwrap();

        assert_eq!(store.load_all().unwrap(), reminders);
    }

    #[test]
    fn on_disk_format_uses_plain_dates() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReminderStore::with_path(dir.path().join(REMINDERS_FILE));
        store
            .save_all(&[ScheduledReminder::new(date(2025, 3, 1), "hello")])
            .unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw[0]["date"], "2025-03-01");
        assert_eq!(raw[0]["message"], "hello");
    }

    #[test]
    fn reads_files_written_by_hand() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(REMINDERS_FILE);
        std::fs::write(
            &path,
            r#"[{"date": "2024-12-31", "message": "Reminder: Joining date for job is tomorrow.\nx"}]"#,
        )
        .unwrap();

        let loaded = ReminderStore::with_path(path).load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].date, date(2024, 12, 31));
    }

    #[test]
    fn rejects_malformed_dates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(REMINDERS_FILE);
        std::fs::write(&path, r#"[{"date": "31/12/2024", "message": "x"}]"#).unwrap();

        assert!(ReminderStore::with_path(path).load_all().is_err());
    }

    #[test]
    fn due_includes_today() {
        let r = ScheduledReminder::new(date(2025, 2, 20), "x");
        assert!(r.is_due(date(2025, 2, 20)));
        assert!(r.is_due(date(2025, 2, 21)));
        assert!(!r.is_due(date(2025, 2, 19)));
    }
}
