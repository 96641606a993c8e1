//! Persistence of the cache documents.

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};
use watchlist_config::PathManager;
use watchlist_models::{Document, MediaRecord, RecordDocument, Settings, SettingsDocument};

pub const WATCHLIST_KEY: &str = "watchlist.json";
pub const UNKNOWNS_KEY: &str = "unknownlist.json";
pub const SETTINGS_KEY: &str = "settings.json";

/// Whole-document storage addressed by key.
pub trait DocumentStore: Send + Sync {
    /// `None` when the document does not exist.
    fn read(&self, key: &str) -> Result<Option<String>>;

    fn write(&self, key: &str, contents: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}

/// One JSON file per document inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create cache directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl DocumentStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Some(contents))
    }

    fn write(&self, key: &str, contents: &str) -> Result<()> {
        let path = self.path(key);
        // Atomic write: write to temp file, then rename
        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, contents)
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        std::fs::rename(&temp_path, &path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path(key);
        if path.exists() {
            std::fs::remove_file(&path).with_context(|| format!("Failed to remove {}", path.display()))?;
        }
        Ok(())
    }
}

/// Documents held in memory, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let documents = self.documents.lock().map_err(|_| anyhow!("memory store lock poisoned"))?;
        Ok(documents.get(key).cloned())
    }

    fn write(&self, key: &str, contents: &str) -> Result<()> {
        let mut documents = self.documents.lock().map_err(|_| anyhow!("memory store lock poisoned"))?;
        documents.insert(key.to_string(), contents.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut documents = self.documents.lock().map_err(|_| anyhow!("memory store lock poisoned"))?;
        documents.remove(key);
        Ok(())
    }
}

/// Typed access to the watchlist, unknown-list and settings documents.
#[derive(Clone)]
pub struct CacheManager {
    store: Arc<dyn DocumentStore>,
}

impl CacheManager {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// File-backed cache under the data directory.
    pub fn from_paths(path_manager: &PathManager) -> Result<Self> {
        Ok(Self::new(Arc::new(FileStore::new(path_manager.cache_dir())?)))
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn load_watchlist(&self) -> Result<RecordDocument> {
        self.load_document(WATCHLIST_KEY)
    }

    pub fn save_watchlist(&self, records: &[MediaRecord]) -> Result<RecordDocument> {
        self.save_records(WATCHLIST_KEY, records)
    }

    pub fn load_unknowns(&self) -> Result<RecordDocument> {
        self.load_document(UNKNOWNS_KEY)
    }

    pub fn save_unknowns(&self, records: &[MediaRecord]) -> Result<RecordDocument> {
        self.save_records(UNKNOWNS_KEY, records)
    }

    pub fn load_settings(&self) -> Result<SettingsDocument> {
        self.load_document(SETTINGS_KEY)
    }

    pub fn save_settings(&self, settings: Settings) -> Result<SettingsDocument> {
        let document = Document::new(settings);
        self.save_document(SETTINGS_KEY, &document)?;
        Ok(document)
    }

    /// Remove every cache document.
    pub fn clear(&self) -> Result<()> {
        for key in [WATCHLIST_KEY, UNKNOWNS_KEY, SETTINGS_KEY] {
            self.store.remove(key)?;
        }
        info!(operation = "cache_clear", "Cleared cache documents");
        Ok(())
    }

    fn save_records(&self, key: &str, records: &[MediaRecord]) -> Result<RecordDocument> {
        let document = Document::new(records.to_vec());
        self.save_document(key, &document)?;
        Ok(document)
    }

    /// Missing and unreadable documents both load as empty.
    fn load_document<T>(&self, key: &str) -> Result<Document<T>>
    where
        T: DeserializeOwned + Default,
    {
        let contents = match self.store.read(key) {
            Ok(Some(contents)) => contents,
            Ok(None) => {
                debug!("Cache miss: {} (document does not exist)", key);
                return Ok(Document::default());
            }
            Err(e) => {
                warn!("Failed to read cache document {}: {}", key, e);
                return Ok(Document::default());
            }
        };

        match serde_json::from_str::<Document<T>>(&contents) {
            Ok(document) => {
                debug!("Cache hit: {}", key);
                Ok(document)
            }
            Err(e) => {
                warn!("Cache corruption detected for {}: {}. Treating it as empty.", key, e);
                Ok(Document::default())
            }
        }
    }

    fn save_document<T: Serialize>(&self, key: &str, document: &Document<T>) -> Result<()> {
        let json = serde_json::to_string_pretty(document)
            .with_context(|| format!("Failed to serialize {}", key))?;
        self.store.write(key, &json)?;
        debug!("Cache saved: {}", key);
        Ok(())
    }
}
