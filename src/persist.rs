//! Write-to-temp-then-rename helpers.
//!
//! Readers of a cache entry or a derivative either see the previous state
//! (absent) or the complete new file, never a partial write. Every write
//! gets its own temporary file, so concurrent writers of one target never
//! trip over each other; the last rename wins.

use crate::error::Result;
use std::io::Write;
use std::path::Path;

/// Prefix of in-flight temporary files.
pub const TEMP_PREFIX: &str = ".bfs-";

/// Suffix of in-flight temporary files.
pub const TEMP_SUFFIX: &str = ".partial";

/// Whether `name` is an in-flight temporary file written by this module.
pub fn is_temp_name(name: &str) -> bool {
    name.starts_with(TEMP_PREFIX) && name.ends_with(TEMP_SUFFIX)
}

/// Atomically replace `target` with `data` (blocking).
pub fn write_atomic(target: &Path, data: &[u8]) -> Result<()> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(TEMP_SUFFIX)
        .tempfile_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(target).map_err(|e| e.error)?;
    Ok(())
}

/// Atomically replace `target` with `data` without blocking the runtime.
pub async fn write_atomic_async(target: &Path, data: &[u8]) -> Result<()> {
    let target = target.to_path_buf();
    let data = data.to_vec();
    tokio::task::spawn_blocking(move || write_atomic(&target, &data))
        .await
        .map_err(|e| crate::error::AppError::Internal(format!("Write task failed: {}", e)))?
}
