//! Key-value backends for transform records.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::record::TransformRecord;
use super::PersistenceError;

/// A place to keep transform records by key.
///
/// Writes take `&mut self`; a store belongs to one session at a time.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<TransformRecord>, PersistenceError>;

    fn set(&mut self, key: &str, record: &TransformRecord) -> Result<(), PersistenceError>;

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError>;
}

/// In-memory store. Nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, TransformRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<TransformRecord>, PersistenceError> {
        Ok(self.entries.get(key).copied())
    }

    fn set(&mut self, key: &str, record: &TransformRecord) -> Result<(), PersistenceError> {
        self.entries.insert(key.to_string(), *record);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Records kept as one JSON object in a file.
///
/// ```text
/// { "transform": { "a": 1.0, "b": 0.0, "c": 0.0, "d": 1.0, "tx": 0.0, "ty": 0.0 } }
/// ```
///
/// Every write replaces the file through a sibling `.tmp` file and a
/// rename, so readers never see a half-written object. A missing or empty
/// file reads as an empty store.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, TransformRecord>, PersistenceError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_all(&self, entries: &BTreeMap<String, TransformRecord>) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let contents = serde_json::to_string_pretty(entries)?;
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, contents)?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<TransformRecord>, PersistenceError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, record: &TransformRecord) -> Result<(), PersistenceError> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), *record);
        self.write_all(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::AffineTransform;

    fn record(tx: f64) -> TransformRecord {
        TransformRecord::from_transform(&AffineTransform::translate(tx, 0.0))
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", &record(1.0)).unwrap();
        store.set("k", &record(2.0)).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("k").unwrap(), Some(record(2.0)));

        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_json_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("transforms.json");

        let mut store = JsonFileStore::new(&path);
        assert_eq!(store.get("a").unwrap(), None);

        store.set("a", &record(1.0)).unwrap();
        store.set("b", &record(2.0)).unwrap();

        // A fresh handle sees the same data.
        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.get("a").unwrap(), Some(record(1.0)));
        assert_eq!(reopened.get("b").unwrap(), Some(record(2.0)));
        assert!(!path.with_extension("json.tmp").exists());

        store.remove("a").unwrap();
        assert_eq!(reopened.get("a").unwrap(), None);
        assert_eq!(reopened.get("b").unwrap(), Some(record(2.0)));
    }

    #[test]
    fn test_json_file_store_reads_foreign_partial_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.json");
        fs::write(&path, r#"{"transform": {"a": 2.0, "tx": 4.0}}"#).unwrap();

        let store = JsonFileStore::new(&path);
        let got = store.get("transform").unwrap().unwrap();
        assert_eq!(got.a, Some(2.0));
        assert_eq!(got.d, None);
    }

    #[test]
    fn test_json_file_store_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.json");
        fs::write(&path, "  \n").unwrap();
        assert_eq!(JsonFileStore::new(&path).get("x").unwrap(), None);
    }

    #[test]
    fn test_json_file_store_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            JsonFileStore::new(&path).get("x"),
            Err(PersistenceError::Json(_))
        ));
    }
}
