use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::AppError;

/// Write `content` to `path` through a temp file in the same directory,
/// then rename it into place. Missing parent directories are created.
pub fn write_atomic(path: &Path, content: &str) -> Result<(), AppError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| {
        AppError::PersistenceError(format!("cannot create {}: {e}", dir.display()))
    })?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(path).map_err(|e| {
        AppError::PersistenceError(format!("cannot write {}: {}", path.display(), e.error))
    })?;
    Ok(())
}
