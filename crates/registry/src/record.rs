// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The decoded form of one authorized client's grant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One authorized client's long-lived grant, as written by the pairing flow.
///
/// Only `username`, `client_name` and `auth_expires` are interpreted. Any other
/// fields in the stored document (key material and the like) are carried in
/// `material` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRecord {
    /// Storage key suffix and live-session join key.
    pub username: String,
    /// Display label chosen by the client. Not unique.
    #[serde(default)]
    pub client_name: String,
    /// Advisory expiry. Enforcement belongs to the RPC authentication check.
    pub auth_expires: DateTime<Utc>,
    #[serde(flatten)]
    pub material: serde_json::Map<String, serde_json::Value>,
}

impl CredentialRecord {
    pub fn new(
        username: impl Into<String>,
        client_name: impl Into<String>,
        auth_expires: DateTime<Utc>,
    ) -> Self {
        Self {
            username: username.into(),
            client_name: client_name.into(),
            auth_expires,
            material: serde_json::Map::new(),
        }
    }

    /// Attach an opaque field to the record.
    pub fn with_material(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.material.insert(key.into(), value);
        self
    }

    /// Whether the advisory expiry has passed at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.auth_expires <= now
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
