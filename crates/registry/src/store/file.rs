// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-backed blob store: a JSON object on disk with atomic rewrites.
//!
//! The file may hold settings belonging to other components, including
//! non-string values. Those are preserved on every rewrite and read back as
//! their JSON text.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

use indexmap::IndexMap;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::StoreError;
use crate::store::BlobStore;

type Document = IndexMap<String, serde_json::Value>;

/// [`BlobStore`] persisted as a JSON object, re-read on every operation.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Document, StoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Document::new()),
            Err(e) => return Err(StoreError::Read(format!("{}: {e}", self.path.display()))),
        };
        if contents.trim().is_empty() {
            return Ok(Document::new());
        }
        serde_json::from_str(&contents)
            .map_err(|e| StoreError::Format(format!("{}: {e}", self.path.display())))
    }

    /// Write tmp + rename. The temp name is unique per process and call so
    /// concurrent saves never share a partially written file.
    fn save(&self, doc: &Document) -> Result<(), StoreError> {
        static COUNTER: AtomicU32 = AtomicU32::new(0);

        let write_err = |e: std::io::Error| StoreError::Write(format!("{}: {e}", self.path.display()));

        let json = serde_json::to_string_pretty(doc)
            .map_err(|e| StoreError::Write(format!("serialize: {e}")))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
        let tmp_name = format!(
            "{}.{}.{}.tmp",
            self.path.file_name().unwrap_or_default().to_string_lossy(),
            std::process::id(),
            seq,
        );
        let tmp_path = self.path.with_file_name(tmp_name);
        std::fs::write(&tmp_path, json).map_err(write_err)?;
        if let Err(e) = std::fs::rename(&tmp_path, &self.path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(write_err(e));
        }
        Ok(())
    }
}

/// Stored value as a string. Null reads as empty; any other non-string value
/// reads as its JSON text, which never decodes as a credential.
fn as_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl BlobStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let doc = self.load()?;
        Ok(doc.get(key).map(as_string))
    }

    fn set(&self, key: &str, value: Option<&str>) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();
        let mut doc = self.load()?;
        match value {
            Some(v) => {
                doc.insert(key.to_owned(), serde_json::Value::String(v.to_owned()));
            }
            None => {
                if doc.shift_remove(key).is_none() {
                    debug!(key, "delete of absent key, nothing to write");
                    return Ok(());
                }
            }
        }
        self.save(&doc)
    }

    fn entries(&self, prefix: &str) -> Result<Vec<(String, String)>, StoreError> {
        let doc = self.load()?;
        Ok(doc
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), as_string(v)))
            .collect())
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
