// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential blob store: a string-keyed persistent map shared with the rest
//! of the host application's settings.
//!
//! Registry entries are namespaced as `<namespace>.Key.<username>`; the key is
//! the only index.

pub mod file;
pub mod memory;

use crate::error::StoreError;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Default namespace owning credential keys.
pub const DEFAULT_NAMESPACE: &str = "KeePassRPC";

/// Persistent string-keyed store.
pub trait BlobStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write `value` under `key`; `None` removes the key. Removing an absent
    /// key succeeds.
    fn set(&self, key: &str, value: Option<&str>) -> Result<(), StoreError>;

    /// Every `(key, value)` whose key starts with `prefix`, in insertion order.
    fn entries(&self, prefix: &str) -> Result<Vec<(String, String)>, StoreError>;
}

/// Maps usernames to store keys and back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialKeys {
    prefix: String,
}

impl CredentialKeys {
    pub fn new(namespace: &str) -> Self {
        Self { prefix: format!("{namespace}.Key.") }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn key_for(&self, username: &str) -> String {
        format!("{}{username}", self.prefix)
    }

    /// Username suffix of a credential key, or `None` if `key` is outside the
    /// namespace.
    pub fn username_of<'a>(&self, key: &'a str) -> Option<&'a str> {
        key.strip_prefix(self.prefix.as_str())
    }
}

impl Default for CredentialKeys {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
