//! Key-value persistence for operator-owned settings.
//!
//! The dashboard only ever needs "get string by key" and "set string by
//! key". [`KeyValueStore`] captures that so the location store can run
//! against a JSON file in production and an in-memory map in tests.

pub mod locations;

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub use locations::{DeviceLocation, LocationInput, LocationStore};

pub trait KeyValueStore: Send + Sync {
    /// # Errors
    ///
    /// Returns an I/O error if the backing medium cannot be read.
    fn get(&self, key: &str) -> io::Result<Option<String>>;

    /// # Errors
    ///
    /// Returns an I/O error if the backing medium cannot be written.
    fn set(&mut self, key: &str, value: String) -> io::Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> io::Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// All keys live in one JSON object on disk. Writes go to a sibling
/// temporary file first and are renamed into place.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> io::Result<BTreeMap<String, String>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e),
        };
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&contents).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: String) -> io::Result<()> {
        let mut entries = self.read_all().unwrap_or_else(|e| {
            tracing::warn!(error = %e, path = %self.path.display(), "Discarding unreadable store file");
            BTreeMap::new()
        });
        entries.insert(key.to_string(), value);

        let json = serde_json::to_vec_pretty(&entries)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)
    }
}
