//! Local key/value cache
//!
//! The last good content snapshot is mirrored here so the book can paint
//! uploaded pages before the store answers. Values are JSON text; a value
//! that does not parse counts as a miss.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::content::record::{ContentSnapshot, RemoteImageRecord};
use crate::core::errors::{anyhow, BookContext, BookResult};
use crate::core::settings::UPLOADED_IMAGES_KEY;

pub trait LocalCache: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String) -> BookResult<()>;
}

/// Cache that lives only as long as the process
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<BTreeMap<String, String>>,
}

impl LocalCache for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: String) -> BookResult<()> {
        self.entries
            .write()
            .map_err(|_| anyhow!("Memory cache lock poisoned"))?
            .insert(key.to_string(), value);
        Ok(())
    }
}

/// Cache backed by one JSON object on disk, rewritten whole on every set
#[derive(Debug)]
pub struct FileCache {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileCache {
    /// Opens the cache file. A missing file is an empty cache, and so is a
    /// corrupt one (it gets replaced on the next write).
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                log::warn!("Ignoring corrupt cache file {}: {}", path.display(), e);
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                log::warn!("Could not read cache file {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };
        Self {
            path,
            entries: RwLock::new(entries),
        }
    }
}

impl LocalCache for FileCache {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: String) -> BookResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| anyhow!("File cache lock poisoned"))?;
        entries.insert(key.to_string(), value);
        let text = serde_json::to_string_pretty(&*entries)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_file_context("create", parent)?;
        }
        fs::write(&self.path, text).with_file_context("write", &self.path)?;
        Ok(())
    }
}

/// The mirrored snapshot, if the cache holds a readable one
pub fn read_snapshot(cache: &dyn LocalCache) -> Option<ContentSnapshot> {
    let text = cache.get(UPLOADED_IMAGES_KEY)?;
    match serde_json::from_str::<Vec<RemoteImageRecord>>(&text) {
        Ok(records) => Some(ContentSnapshot::new(records)),
        Err(e) => {
            log::warn!("Cached '{}' is not readable: {}", UPLOADED_IMAGES_KEY, e);
            None
        }
    }
}

pub fn write_snapshot(cache: &dyn LocalCache, snapshot: &ContentSnapshot) -> BookResult<()> {
    let text = serde_json::to_string(snapshot.records())?;
    cache.set(UPLOADED_IMAGES_KEY, text)
}
