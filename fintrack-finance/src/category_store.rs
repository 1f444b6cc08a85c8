//! Category store: the category dictionary plus the storage it is persisted
//! to.
//!
//! Every mutation is applied to a copy, saved, and only then adopted, so the
//! in-memory dictionary never runs ahead of the persisted one. Loads fail soft:
//! a missing or malformed document yields the default dictionary.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use fintrack_core::{CategoryDictionary, Error, Result};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Where a category dictionary is persisted
pub trait DictionaryStorage {
    /// `Ok(None)` when nothing has been persisted yet
    fn load(&self) -> Result<Option<CategoryDictionary>>;

    /// Replace the persisted document with `dict`
    fn save(&mut self, dict: &CategoryDictionary) -> Result<()>;
}

/// JSON document `{category: [keyword, ...]}` on disk
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DictionaryStorage for JsonFileStorage {
    fn load(&self) -> Result<Option<CategoryDictionary>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let s = fs::read_to_string(&self.path)
            .map_err(|e| Error::Persistence(format!("read {}: {e}", self.path.display())))?;
        let dict = serde_json::from_str(&s)
            .map_err(|e| Error::Persistence(format!("parse {}: {e}", self.path.display())))?;
        Ok(Some(dict))
    }

    fn save(&mut self, dict: &CategoryDictionary) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let write_err = |e: std::io::Error| Error::Persistence(format!("write {}: {e}", self.path.display()));

        fs::create_dir_all(&dir).map_err(write_err)?;

        // Write beside the target and rename over it so readers never see a
        // half-written document.
        let mut tmp = NamedTempFile::new_in(&dir).map_err(write_err)?;
        let json = serde_json::to_string_pretty(dict)
            .map_err(|e| Error::Persistence(format!("serialize categories: {e}")))?;
        tmp.write_all(json.as_bytes()).map_err(write_err)?;
        tmp.flush().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}

/// In-process storage; counts writes so callers can observe the write boundary
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    saved: Option<CategoryDictionary>,
    writes: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that already holds `dict`, as if saved by an earlier session
    pub fn with(dict: CategoryDictionary) -> Self {
        Self {
            saved: Some(dict),
            writes: 0,
        }
    }

    pub fn saved(&self) -> Option<&CategoryDictionary> {
        self.saved.as_ref()
    }

    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl DictionaryStorage for MemoryStorage {
    fn load(&self) -> Result<Option<CategoryDictionary>> {
        Ok(self.saved.clone())
    }

    fn save(&mut self, dict: &CategoryDictionary) -> Result<()> {
        self.saved = Some(dict.clone());
        self.writes += 1;
        Ok(())
    }
}

/// Owns the session's category dictionary and persists every change
#[derive(Debug)]
pub struct CategoryStore<S: DictionaryStorage = JsonFileStorage> {
    storage: S,
    dict: CategoryDictionary,
}

impl CategoryStore<JsonFileStorage> {
    /// Open the JSON dictionary at `path` (defaults apply if absent)
    pub fn open_path(path: impl Into<PathBuf>) -> Self {
        Self::open(JsonFileStorage::new(path))
    }
}

impl<S: DictionaryStorage> CategoryStore<S> {
    pub fn open(storage: S) -> Self {
        let dict = load(&storage);
        Self { storage, dict }
    }

    pub fn dictionary(&self) -> &CategoryDictionary {
        &self.dict
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    #[cfg(test)]
    pub(crate) fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Read the persisted dictionary (fail-soft), without touching the
    /// in-memory copy
    pub fn load(&self) -> CategoryDictionary {
        load(&self.storage)
    }

    /// Replace the in-memory dictionary with the persisted one
    pub fn reload(&mut self) {
        self.dict = load(&self.storage);
    }

    /// Write the full dictionary
    pub fn save(&mut self) -> Result<()> {
        self.storage.save(&self.dict)?;
        debug!(categories = self.dict.len(), "Saved category dictionary");
        Ok(())
    }

    /// Persist `next` and only then adopt it, so a failed write leaves the
    /// in-memory dictionary matching what is on disk.
    fn commit(&mut self, next: CategoryDictionary) -> Result<()> {
        self.storage.save(&next)?;
        debug!(categories = next.len(), "Saved category dictionary");
        self.dict = next;
        Ok(())
    }

    /// Add an empty category. Returns `false` (and writes nothing) if it
    /// already exists.
    pub fn create_category(&mut self, name: &str) -> Result<bool> {
        let mut next = self.dict.clone();
        if !next.insert_category(name)? {
            return Ok(false);
        }
        self.commit(next)?;
        info!(category = name.trim(), "Created category");
        Ok(true)
    }

    pub fn delete_category(&mut self, name: &str) -> Result<()> {
        let mut next = self.dict.clone();
        next.remove_category(name)?;
        self.commit(next)?;
        info!(category = name, "Deleted category");
        Ok(())
    }

    /// Teach `category` a keyword. Returns whether it was inserted.
    pub fn add_keyword(&mut self, category: &str, keyword: &str) -> Result<bool> {
        let previous = self.dict.owner_of(keyword).map(str::to_string);
        let mut next = self.dict.clone();
        if !next.insert_keyword(category, keyword)? {
            return Ok(false);
        }
        self.commit(next)?;
        match previous {
            Some(prev) => info!(category, keyword, from = %prev, "Moved keyword"),
            None => info!(category, keyword, "Learned keyword"),
        }
        Ok(true)
    }

    /// Forget a keyword. Returns the category that held it.
    pub fn remove_keyword(&mut self, keyword: &str) -> Result<Option<String>> {
        let mut next = self.dict.clone();
        let owner = next.remove_keyword(keyword);
        if let Some(ref category) = owner {
            self.commit(next)?;
            info!(category = %category, keyword, "Forgot keyword");
        }
        Ok(owner)
    }
}

fn load<S: DictionaryStorage>(storage: &S) -> CategoryDictionary {
    match storage.load() {
        Ok(Some(dict)) => dict,
        Ok(None) => CategoryDictionary::default(),
        Err(e) => {
            warn!(error = %e, "Category dictionary unreadable, using defaults");
            CategoryDictionary::default()
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Memory storage whose next `save` fails
    #[derive(Debug, Default)]
    pub(crate) struct FlakyStorage {
        pub(crate) inner: MemoryStorage,
        pub(crate) fail_next: bool,
    }

    impl DictionaryStorage for FlakyStorage {
        fn load(&self) -> Result<Option<CategoryDictionary>> {
            self.inner.load()
        }

        fn save(&mut self, dict: &CategoryDictionary) -> Result<()> {
            if std::mem::take(&mut self.fail_next) {
                return Err(Error::Persistence("disk full".to_string()));
            }
            self.inner.save(dict)
        }
    }
}
