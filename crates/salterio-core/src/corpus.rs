//! JSON corpus files: load, save, backup-then-replace.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::models::{ContentRecord, ReferenceEntry};
use crate::persist::write_atomic;

/// A corpus file on disk: a pretty-printed JSON array of records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusStore {
    path: PathBuf,
}

impl CorpusStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `<stem>_backup.<ext>` next to the corpus file.
    pub fn backup_path(&self) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "corpus".to_string());
        let ext = self
            .path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_else(|| "json".to_string());
        self.path.with_file_name(format!("{stem}_backup.{ext}"))
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Strict load: a missing or malformed file is an error.
    pub fn load(&self) -> Result<Vec<ContentRecord>, AppError> {
        let raw = fs::read_to_string(&self.path).map_err(|e| {
            AppError::PersistenceError(format!("cannot read {}: {e}", self.path.display()))
        })?;
        let records = serde_json::from_str(&raw)?;
        Ok(records)
    }

    /// Lenient load: a missing or unparsable file is an empty corpus.
    pub fn load_or_empty(&self) -> Vec<ContentRecord> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(records) => records,
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), error = %e, "Unparsable corpus, starting empty");
                    Vec::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "No corpus yet, starting empty");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Unreadable corpus, starting empty");
                Vec::new()
            }
        }
    }

    pub fn save(&self, records: &[ContentRecord]) -> Result<(), AppError> {
        write_atomic(&self.path, &to_pretty_json(records)?)?;
        tracing::debug!(path = %self.path.display(), count = records.len(), "Corpus saved");
        Ok(())
    }

    /// Copy the current file byte for byte to [`CorpusStore::backup_path`].
    /// Returns `None` when there is no file to back up.
    pub fn backup(&self) -> Result<Option<PathBuf>, AppError> {
        if !self.exists() {
            return Ok(None);
        }
        let current = fs::read_to_string(&self.path)?;
        let backup = self.backup_path();
        write_atomic(&backup, &current)?;
        tracing::info!(backup = %backup.display(), "Corpus backup written");
        Ok(Some(backup))
    }

    /// Back up the existing file, then overwrite it with `records`.
    pub fn replace(&self, records: &[ContentRecord]) -> Result<(), AppError> {
        self.backup()?;
        self.save(records)
    }
}

fn to_pretty_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Load the secondary index used as reconciliation reference.
pub fn load_references(path: &Path) -> Result<Vec<ReferenceEntry>, AppError> {
    let raw = fs::read_to_string(path).map_err(|e| {
        AppError::PersistenceError(format!("cannot read {}: {e}", path.display()))
    })?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Classification;
    use tempfile::TempDir;

    fn record(id: u64, link: &str) -> ContentRecord {
        ContentRecord {
            id,
            classification: Classification::Liturgical {
                ciclo: "A".into(),
                tiempo_liturgico: "Pascua".into(),
            },
            title: format!("Post {id}"),
            readings: String::new(),
            summary: "resumen".into(),
            link: link.into(),
        }
    }

    #[test]
    fn test_backup_path_is_distinct() {
        let store = CorpusStore::new("/data/contemplaciones.json");
        assert_eq!(
            store.backup_path(),
            PathBuf::from("/data/contemplaciones_backup.json")
        );
    }

    #[test]
    fn test_missing_and_garbage_files_load_empty() {
        let dir = TempDir::new().unwrap();
        let store = CorpusStore::new(dir.path().join("c.json"));
        assert!(store.load_or_empty().is_empty());
        assert!(store.load().is_err());

        fs::write(store.path(), "{not json").unwrap();
        assert!(store.load_or_empty().is_empty());
        assert!(matches!(
            store.load().unwrap_err(),
            AppError::SerializationError(_)
        ));
    }

    #[test]
    fn test_save_is_indented_and_loads_back() {
        let dir = TempDir::new().unwrap();
        let store = CorpusStore::new(dir.path().join("c.json"));
        store.save(&[record(1, "https://x/1")]).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.starts_with("[\n  {"));
        assert!(raw.contains("\"titulo\": \"Post 1\""));
        assert_eq!(store.load().unwrap(), vec![record(1, "https://x/1")]);
    }

    #[test]
    fn test_replace_keeps_previous_content_as_backup() {
        let dir = TempDir::new().unwrap();
        let store = CorpusStore::new(dir.path().join("c.json"));
        store.save(&[record(1, "")]).unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        store.replace(&[record(1, ""), record(2, "")]).unwrap();

        assert_eq!(fs::read_to_string(store.backup_path()).unwrap(), before);
        assert_eq!(store.load().unwrap().len(), 2);
    }

    #[test]
    fn test_first_replace_has_nothing_to_back_up() {
        let dir = TempDir::new().unwrap();
        let store = CorpusStore::new(dir.path().join("c.json"));
        assert_eq!(store.backup().unwrap(), None);
        store.replace(&[record(1, "")]).unwrap();
        assert!(!store.backup_path().exists());
    }

    #[test]
    fn test_load_references_with_missing_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.json");
        fs::write(
            &path,
            r#"[{"title": "El Buen Pastor", "file": "contemplaciones - 2024", "link": "https://x/bp"},
                {"title": "Sin link"}]"#,
        )
        .unwrap();
        let refs = load_references(&path).unwrap();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[1].link, "");
    }
}
