// SPDX-License-Identifier: MIT

//! A generic, atomically-persisted JSON document mapping string keys to
//! entity records, plus the two concrete stores (scheduler state, job
//! state) built on top of it.
//!
//! Persistence contract (spec.md §4.4): every mutating call updates the
//! in-memory map, then the whole document is serialized and written
//! atomically — write to a `.tmp` sibling, `fsync`, `rename` over the
//! original. Partial writes are never observable because the rename is the
//! only operation that makes the new content visible at the final path.

use crate::error::StateError;
use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, serde::Deserialize)]
struct Document<T> {
    last_updated: u64,
    #[serde(default)]
    entries: BTreeMap<String, T>,
}

impl<T> Default for Document<T> {
    fn default() -> Self {
        Self { last_updated: 0, entries: BTreeMap::new() }
    }
}

/// A document-level store for one JSON file, keyed by an arbitrary string.
///
/// A single `parking_lot::Mutex` serializes all reads and writes: the store
/// is the synchronization point the "skip if busy" scheduling invariant
/// (spec.md §4.4) relies on, so a reader lock alone would not be enough —
/// every access goes through the same mutex.
pub struct DocumentStore<T> {
    path: PathBuf,
    inner: Mutex<Document<T>>,
}

impl<T> DocumentStore<T>
where
    T: Clone + DeserializeOwned + Serialize,
{
    /// Open (or lazily create) the document at `path`.
    ///
    /// A missing file is not an error: it is treated as an empty document,
    /// matching spec.md §4.4 ("Missing document on startup → create an
    /// empty one lazily; never fail startup"). A corrupt file logs a
    /// warning and also falls back to empty, rather than blocking startup.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let doc = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(doc) => doc,
                Err(source) => {
                    tracing::warn!(path = %path.display(), error = %source, "corrupt state document, starting empty");
                    Document::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Document::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read state document, starting empty");
                Document::default()
            }
        };
        Self { path, inner: Mutex::new(doc) }
    }

    /// Snapshot a single entry.
    pub fn get(&self, key: &str) -> Option<T> {
        self.inner.lock().entries.get(key).cloned()
    }

    /// Snapshot the whole document.
    pub fn snapshot(&self) -> BTreeMap<String, T> {
        self.inner.lock().entries.clone()
    }

    /// Mutate one entry (creating it with `T::default()` if absent via the
    /// supplied `or_default`), then persist the whole document.
    pub fn mutate<F>(&self, key: &str, at_epoch_ms: u64, or_default: impl FnOnce() -> T, f: F) -> Result<(), StateError>
    where
        F: FnOnce(&mut T),
    {
        let snapshot = {
            let mut doc = self.inner.lock();
            let entry = doc.entries.entry(key.to_string()).or_insert_with(or_default);
            f(entry);
            doc.last_updated = at_epoch_ms;
            Document { last_updated: doc.last_updated, entries: doc.entries.clone() }
        };
        self.persist(&snapshot)
    }

    /// Remove entries whose key is not in `keep`, then persist.
    pub fn retain_keys(&self, keep: impl Fn(&str) -> bool, at_epoch_ms: u64) -> Result<(), StateError> {
        let snapshot = {
            let mut doc = self.inner.lock();
            doc.entries.retain(|k, _| keep(k));
            doc.last_updated = at_epoch_ms;
            Document { last_updated: doc.last_updated, entries: doc.entries.clone() }
        };
        self.persist(&snapshot)
    }

    fn persist(&self, doc: &Document<T>) -> Result<(), StateError> {
        let serialized =
            serde_json::to_vec_pretty(doc).map_err(|source| StateError::Corrupt { path: self.path.display().to_string(), source })?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StateError::Io { path: self.path.display().to_string(), source })?;
        }

        let tmp_path = tmp_sibling(&self.path);
        write_atomic(&tmp_path, &self.path, &serialized)
    }
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

fn write_atomic(tmp_path: &Path, final_path: &Path, contents: &[u8]) -> Result<(), StateError> {
    let write = || -> std::io::Result<()> {
        let mut file = fs::File::create(tmp_path)?;
        file.write_all(contents)?;
        file.sync_all()?;
        fs::rename(tmp_path, final_path)?;
        Ok(())
    };
    write().map_err(|source| StateError::Io { path: final_path.display().to_string(), source })
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
