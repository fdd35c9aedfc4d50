mod atomic;
pub mod checkpoint;
mod config;
pub mod notification_log;
pub mod reminders;

pub use atomic::atomic_write;
pub use checkpoint::CheckpointStore;
pub use config::{
    ClassifierConfig, Config, GmailConfig, NerConfig, NotificationsConfig, PollConfig,
    SummarizerConfig,
};
pub use notification_log::NotificationLog;
pub use reminders::{ReminderStore, ScheduledReminder};

use std::path::PathBuf;

use crate::error::StorageError;

pub const CHECKPOINT_FILE: &str = "last_run.txt";
pub const REMINDERS_FILE: &str = "notification_schedule.json";
pub const NOTIFICATION_LOG_FILE: &str = "notifications.txt";
pub const CONFIG_FILE: &str = "config.toml";

/// Returns the jobwatch data directory.
///
/// `JOBWATCH_DATA_DIR` wins when set. Otherwise `~/.config/jobwatch/`, or
/// `~/.config/jobwatch-dev/` when `JOBWATCH_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("JOBWATCH_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("JOBWATCH_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("jobwatch-dev")
            } else {
                base_dir.join("jobwatch")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| StorageError::DataDir(e.to_string()))?;
    Ok(dir)
}
