//! Snapshot persistence
//!
//! Every store is a whole keyed collection serialized as one JSON document.
//! Services load the snapshot once at construction and write the full
//! collection back after every mutation; there is no partial or append-only
//! persistence.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// A persistence backend for one snapshot collection
pub trait Storage<T>: Send + Sync {
    /// Load the stored snapshot, `None` if nothing was persisted yet
    fn load(&self) -> AppResult<Option<T>>;

    /// Replace the stored snapshot
    fn save(&self, value: &T) -> AppResult<()>;
}

/// JSON file storage with atomic replace-on-write.
///
/// The snapshot is written to a temporary file in the same directory and
/// renamed over the target, so a crash mid-write never leaves a truncated
/// document behind.
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl<T> Storage<T> for JsonFileStorage
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    fn load(&self) -> AppResult<Option<T>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        Ok(Some(serde_json::from_reader(reader)?))
    }

    fn save(&self, value: &T) -> AppResult<()> {
        let dir = self.path.parent().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
        std::fs::create_dir_all(&dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.flush()?;
        }
        tmp.persist(&self.path)
            .map_err(|e| AppError::Storage(format!("atomic replace failed: {}", e)))?;
        Ok(())
    }
}

/// In-memory storage for tests and ephemeral deployments
#[derive(Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<serde_json::Value>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T> Storage<T> for MemoryStorage
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    fn load(&self) -> AppResult<Option<T>> {
        let slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        match &*slot {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    fn save(&self, value: &T) -> AppResult<()> {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(serde_json::to_value(value)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_json_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("codes.json"));

        let loaded: Option<HashMap<String, u32>> = storage.load().unwrap();
        assert!(loaded.is_none());

        let mut data = HashMap::new();
        data.insert("#AAAAAA".to_string(), 1u32);
        storage.save(&data).unwrap();

        let loaded: Option<HashMap<String, u32>> = storage.load().unwrap();
        assert_eq!(loaded.unwrap(), data);
    }

    #[test]
    fn test_json_file_storage_overwrites_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("list.json"));

        storage.save(&vec![1u32, 2, 3]).unwrap();
        storage.save(&vec![4u32]).unwrap();

        let loaded: Option<Vec<u32>> = storage.load().unwrap();
        assert_eq!(loaded.unwrap(), vec![4]);
    }

    #[test]
    fn test_memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        Storage::<Vec<String>>::save(&storage, &vec!["a".to_string()]).unwrap();
        let loaded: Option<Vec<String>> = storage.load().unwrap();
        assert_eq!(loaded.unwrap(), vec!["a".to_string()]);
    }
}
