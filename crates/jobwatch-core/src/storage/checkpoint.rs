//! Poll checkpoint: epoch seconds of the last successful poll, as plain text.

use std::path::{Path, PathBuf};

use super::{atomic_write, data_dir, CHECKPOINT_FILE};
use crate::error::{Result, StorageError};

/// Reads and writes the checkpoint file.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    /// Open the checkpoint in the default data directory.
    pub fn open() -> Result<Self> {
        Ok(Self::with_path(data_dir()?.join(CHECKPOINT_FILE)))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the last checkpoint. A missing file means "no prior checkpoint".
    pub fn load(&self) -> Result<Option<i64>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        trimmed.parse::<i64>().map(Some).map_err(|e| {
            StorageError::Corrupt {
                path: self.path.clone(),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Overwrite the checkpoint with `epoch_secs`.
    pub fn save(&self, epoch_secs: i64) -> Result<()> {
        atomic_write(&self.path, epoch_secs.to_string().as_bytes())?;
        Ok(())
    }
}
