//! Snapshot/replace writes: temp file in the target directory, then rename.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::StorageError;

/// Atomically replace `path` with `content`.
///
/// Readers see either the previous snapshot or the new one, never a
/// partially written file.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<(), StorageError> {
    let fail = |source: std::io::Error| StorageError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(parent).map_err(fail)?;
    temp.write_all(content).map_err(fail)?;
    temp.flush().map_err(fail)?;
    temp.as_file().sync_all().map_err(fail)?;
    temp.persist(path).map_err(|e| fail(e.error))?;
    Ok(())
}
