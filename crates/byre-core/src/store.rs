//! Whole-document persistence.
//!
//! The farm document is read and written as a single JSON file. There is
//! no partial update path: callers load, transform, and save the whole
//! thing. One writer at a time is assumed.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CoreError;
use crate::models::FarmDocument;

#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the document. A missing file is a first run and yields the
    /// empty default; an unreadable or malformed file is an error, never a
    /// silent reset.
    pub fn load(&self) -> Result<FarmDocument, CoreError> {
        if !self.path.exists() {
            return Ok(FarmDocument::default());
        }
        let bytes = fs::read(&self.path)?;
        let document = serde_json::from_slice(&bytes)?;
        Ok(document)
    }

    /// Writes the complete document, creating missing parent directories.
    /// The write goes through a sibling temp file and a rename, so a
    /// crashed save never leaves a half-written document for the next
    /// load.
    pub fn save(&self, document: &FarmDocument) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(document)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DailySignal, FarmDocument};
    use chrono::NaiveDate;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_the_empty_default() {
        let dir = tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("byre.json"));
        assert_eq!(store.load().unwrap(), FarmDocument::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("byre.json"));

        let mut doc = FarmDocument::default();
        let day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        doc.append_daily_log("de-102", DailySignal::empty(day));
        store.save(&doc).unwrap();

        assert_eq!(store.load().unwrap(), doc);
    }

    #[test]
    fn save_creates_missing_parent_directories() {
        let dir = tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("nested/state/byre.json"));
        store.save(&FarmDocument::default()).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn malformed_documents_are_an_error_not_a_reset() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("byre.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = JsonStore::new(path);
        assert!(matches!(store.load(), Err(CoreError::Serialization(_))));
    }

    #[test]
    fn no_temp_file_is_left_behind() {
        let dir = tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("byre.json"));
        store.save(&FarmDocument::default()).unwrap();
        assert!(!dir.path().join("byre.json.tmp").exists());
    }
}
