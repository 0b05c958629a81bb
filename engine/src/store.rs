//! Persistence seam for the engine's ledgers.
//!
//! The engine never touches files or serialization formats directly: it
//! reads and writes opaque strings through [`PersistentStore`]. Decoding is
//! the caller's job and is always tolerant, so a store implementation never
//! has to guarantee well-formed content.

use std::collections::HashMap;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

/// Persisted logical keys. One ledger per key; values are JSON arrays of
/// ids, a boolean string for the completion flag, and a JSON array of
/// snapshots for the undo stack.
pub mod keys {
    pub const SEALED: &str = "sealed-ids";
    pub const WON_THIS_BATCH: &str = "won-this-batch-ids";
    pub const HISTORY: &str = "history-ids";
    pub const FAVORITES: &str = "favorite-ids";
    pub const COMPLETION: &str = "completion-flag";
    pub const UNDO_STACK: &str = "undo-stack";
}

/// String key/value persistence capability, injected into the engine.
///
/// `set` and `remove` are best-effort: implementations log failures and
/// carry on, the engine stays correct in memory either way.
pub trait PersistentStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// In-memory store: the test fake and the default for throwaway sessions.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistentStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_owned(), value.to_owned());
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// File-backed store: one JSON object per session file, rewritten atomically
/// (temp file + rename) on every mutation.
///
/// A missing or corrupt file loads as an empty store with a warning; write
/// failures are logged and swallowed.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl JsonFileStore {
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match Self::read_values(&path) {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!("Ignoring unreadable store {}: {e}", path.display());
                HashMap::new()
            }
        };
        Self { path, values }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_values(path: &Path) -> anyhow::Result<HashMap<String, String>> {
        if !path.exists() {
            return Ok(HashMap::new());
        }
        let raw = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let values = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
        Ok(values)
    }

    fn flush(&self) -> anyhow::Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;

        let json = serde_json::to_string_pretty(&self.values).context("encode store")?;
        let mut tmp = tempfile::NamedTempFile::new_in(parent).context("create temp file")?;
        tmp.write_all(json.as_bytes()).context("write temp file")?;
        tmp.persist(&self.path)
            .with_context(|| format!("persist {}", self.path.display()))?;
        Ok(())
    }

    fn autosave(&self) {
        if let Err(e) = self.flush() {
            tracing::warn!("Autosave failed for {}: {e}", self.path.display());
        }
    }
}

impl PersistentStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_owned(), value.to_owned());
        self.autosave();
    }

    fn remove(&mut self, key: &str) {
        if self.values.remove(key).is_some() {
            self.autosave();
        }
    }
}
