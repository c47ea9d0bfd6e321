// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::error::StoreError;
use crate::store::BlobStore;

/// In-memory [`BlobStore`] preserving insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<IndexMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let values = entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { values: RwLock::new(values) }
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

impl BlobStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: Option<&str>) -> Result<(), StoreError> {
        let mut values = self.values.write();
        match value {
            Some(v) => {
                values.insert(key.to_owned(), v.to_owned());
            }
            None => {
                values.shift_remove(key);
            }
        }
        Ok(())
    }

    fn entries(&self, prefix: &str) -> Result<Vec<(String, String)>, StoreError> {
        Ok(self
            .values
            .read()
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}
