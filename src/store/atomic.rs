//! Crash-safe JSON file writes.
//!
//! Every store file is replaced with write-to-temp-then-rename:
//! 1. Write to `<path>.tmp`
//! 2. fsync the temp file
//! 3. Rename over `<path>`
//! 4. fsync the parent directory
//!
//! A concurrent reader therefore sees either the old file or the new one,
//! never a partial write. Without the directory fsync the rename itself may
//! not survive a power loss.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use super::StoreError;

/// Serializes `value` as pretty JSON and atomically replaces `path` with it.
///
/// Creates the parent directory if needed.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let bytes = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let tmp_path = tmp_path_for(path);
    {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp_path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
    }

    std::fs::rename(&tmp_path, path)?;

    if let Some(parent) = path.parent() {
        fsync_dir(parent)?;
    }
    Ok(())
}

/// Syncs a directory so that entries created or renamed in it are durable.
pub fn fsync_dir(dir_path: &Path) -> io::Result<()> {
    // Read-only is enough to fsync.
    File::open(dir_path)?.sync_all()
}

fn tmp_path_for(path: &Path) -> std::path::PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
