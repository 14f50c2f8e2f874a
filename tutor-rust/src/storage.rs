//! Named-record byte storage backing the tutorial history.
//!
//! A `Storage` behaves like a small key/value store: each record name maps to
//! one opaque byte string. Writes replace the whole record.

use crate::errors::PersistenceError;
use std::{
    collections::HashMap,
    fs::{self, File},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};

pub trait Storage: Send + Sync {
    /// Read a record. A record that was never written is `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError>;
    /// Replace a record.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), PersistenceError>;
    /// Delete a record. Deleting a missing record succeeds.
    fn remove(&self, key: &str) -> Result<(), PersistenceError>;
}

/// Stores each record as `<dir>/<key>.json`.
///
/// Writes go to a temporary sibling file that is synced and then renamed over
/// the record, so a crash never leaves a half-written record behind.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, key: &str) -> Result<PathBuf, PersistenceError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(PersistenceError::Unavailable(format!(
                "invalid record name '{key}'"
            )));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        match fs::read(self.record_path(key)?) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), PersistenceError> {
        let path = self.record_path(key)?;
        fs::create_dir_all(&self.dir)?;

        let tmp_path = path.with_extension("json.tmp");
        {
            let mut file = File::create(&tmp_path)?;
            file.write_all(value)?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        match fs::remove_file(self.record_path(key)?) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}

/// Process-local storage, used in tests and when nothing should touch disk.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_records<T>(
        &self,
        f: impl FnOnce(&mut HashMap<String, Vec<u8>>) -> T,
    ) -> Result<T, PersistenceError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| PersistenceError::Unavailable("memory storage lock poisoned".into()))?;
        Ok(f(&mut records))
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        self.with_records(|records| records.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), PersistenceError> {
        self.with_records(|records| {
            records.insert(key.to_string(), value.to_vec());
        })
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        self.with_records(|records| {
            records.remove(key);
        })
    }
}
