//! Key-value persistence. Reads never fail; callers fall back to defaults.

use std::{
    fs,
    path::{Path, PathBuf},
};
#[cfg(test)]
use std::{collections::HashMap, sync::Mutex};

use log::{debug, warn};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::Result;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Vec<u8>>;
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;
}

/// One JSON file per key inside a data directory.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        fs::read(self.path(key)).ok()
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        // Write then rename so a crash never leaves half a snapshot behind.
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, self.path(key))?;
        Ok(())
    }
}

#[cfg(test)]
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_vec());
        }
        Ok(())
    }
}

/// Outcome of reading a typed entry.
#[derive(Debug, PartialEq)]
pub enum Loaded<T> {
    Missing,
    Corrupt,
    Found(T),
}

impl<T> Loaded<T> {
    pub fn ok(self) -> Option<T> {
        match self {
            Loaded::Found(value) => Some(value),
            _ => None,
        }
    }
}

pub fn load<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Loaded<T> {
    let Some(bytes) = store.get(key) else {
        debug!("no stored value for '{key}'");
        return Loaded::Missing;
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => Loaded::Found(value),
        Err(e) => {
            warn!("discarding undecodable value for '{key}': {e}");
            Loaded::Corrupt
        }
    }
}

pub fn load_or_default<T: DeserializeOwned + Default>(store: &dyn KeyValueStore, key: &str) -> T {
    load(store, key).ok().unwrap_or_default()
}

pub fn save<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    store.set(key, &serde_json::to_vec_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trips_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("beagle")).unwrap();

        save(&store, "randomToggle", &true).unwrap();

        assert!(store.dir().join("randomToggle.json").exists());
        assert_eq!(load::<bool>(&store, "randomToggle"), Loaded::Found(true));
    }

    #[test]
    fn missing_and_corrupt_entries_are_distinguished() {
        let store = MemoryStore::default();
        store.set("quotes", b"not json").unwrap();

        assert_eq!(load::<Vec<String>>(&store, "absent"), Loaded::Missing);
        assert_eq!(load::<Vec<String>>(&store, "quotes"), Loaded::Corrupt);
    }

    #[test]
    fn decode_failure_falls_back_to_default() {
        let store = MemoryStore::default();
        store.set("setTimeToggle", b"\"yes\"").unwrap();

        assert!(!load_or_default::<bool>(&store, "setTimeToggle"));
    }
}
