// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test infrastructure: fixtures, fakes, and failure injection.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use crate::codec::{encode_legacy, CredentialCodec};
use crate::error::{SessionError, StoreError};
use crate::protect::{DataProtector, UserKeyProtector, KEY_LEN};
use crate::record::CredentialRecord;
use crate::session::{LiveSession, LiveSessionSet};
use crate::store::{BlobStore, CredentialKeys, MemoryStore};

/// Fixed expiry used by [`record`].
pub fn fixed_expiry() -> DateTime<Utc> {
    Utc.timestamp_opt(1_893_456_000, 0).single().unwrap_or_default()
}

/// A record for `username` expiring at [`fixed_expiry`].
pub fn record(username: &str, client_name: &str) -> CredentialRecord {
    CredentialRecord::new(username, client_name, fixed_expiry())
}

/// A protector with a fixed, well-known key.
pub fn fixed_protector() -> Arc<dyn DataProtector> {
    match UserKeyProtector::from_key_bytes(&[0x5a; KEY_LEN]) {
        Ok(p) => Arc::new(p),
        Err(_) => Arc::new(UserKeyProtector::without_key()),
    }
}

/// Builds a store of encoded grants in a chosen order.
pub struct StoreBuilder {
    codec: CredentialCodec,
    keys: CredentialKeys,
    entries: Vec<(String, String)>,
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self {
            codec: CredentialCodec::new(fixed_protector()),
            keys: CredentialKeys::default(),
            entries: Vec::new(),
        }
    }

    /// A protected grant for `username`.
    pub fn grant(mut self, username: &str, client_name: &str) -> Self {
        let blob = self.codec.encode(&record(username, client_name)).unwrap_or_default();
        self.entries.push((self.keys.key_for(username), blob));
        self
    }

    /// A grant written before protection existed.
    pub fn legacy_grant(mut self, username: &str, client_name: &str) -> Self {
        let blob = encode_legacy(&record(username, client_name)).unwrap_or_default();
        self.entries.push((self.keys.key_for(username), blob));
        self
    }

    /// An arbitrary raw value under `username`'s key.
    pub fn raw(mut self, username: &str, value: &str) -> Self {
        self.entries.push((self.keys.key_for(username), value.to_owned()));
        self
    }

    /// A setting outside the credential namespace.
    pub fn setting(mut self, key: &str, value: &str) -> Self {
        self.entries.push((key.to_owned(), value.to_owned()));
        self
    }

    pub fn build(self) -> MemoryStore {
        MemoryStore::from_entries(self.entries)
    }
}

/// A store whose reads and writes can be made to fail.
#[derive(Debug, Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
}

impl FlakyStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self { inner, ..Default::default() }
    }

    pub fn failing_writes(self) -> Self {
        self.fail_writes.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_reads(self) -> Self {
        self.fail_reads.store(true, Ordering::SeqCst);
        self
    }
}

impl BlobStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Read("injected read failure".to_owned()));
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: Option<&str>) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Write("injected write failure".to_owned()));
        }
        self.inner.set(key, value)
    }

    fn entries(&self, prefix: &str) -> Result<Vec<(String, String)>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Read("injected read failure".to_owned()));
        }
        self.inner.entries(prefix)
    }
}

/// A live session that counts close calls.
#[derive(Debug, Default)]
pub struct FakeSession {
    pub username: Option<String>,
    pub closes: AtomicU32,
    /// Report `AlreadyClosed` from every close.
    pub already_closed: bool,
}

impl FakeSession {
    pub fn authenticated(username: &str) -> Arc<Self> {
        Arc::new(Self { username: Some(username.to_owned()), ..Default::default() })
    }

    pub fn anonymous() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn closing(username: &str) -> Arc<Self> {
        Arc::new(Self { username: Some(username.to_owned()), already_closed: true, ..Default::default() })
    }

    pub fn close_count(&self) -> u32 {
        self.closes.load(Ordering::SeqCst)
    }
}

impl LiveSession for FakeSession {
    fn username(&self) -> Option<String> {
        self.username.clone()
    }

    fn close(&self) -> Result<(), SessionError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        if self.already_closed {
            return Err(SessionError::AlreadyClosed);
        }
        Ok(())
    }
}

/// A fixed list of fake sessions.
#[derive(Default)]
pub struct FakeSessions {
    pub sessions: Vec<Arc<FakeSession>>,
}

impl FakeSessions {
    pub fn new(sessions: Vec<Arc<FakeSession>>) -> Arc<Self> {
        Arc::new(Self { sessions })
    }
}

impl LiveSessionSet for FakeSessions {
    fn list(&self) -> Vec<Arc<dyn LiveSession>> {
        self.sessions.iter().map(|s| Arc::clone(s) as Arc<dyn LiveSession>).collect()
    }
}

/// Assert that `$expr` is `Err` and its message contains `$substr`.
#[macro_export]
macro_rules! assert_err_contains {
    ($expr:expr, $substr:expr) => {{
        let result = $expr;
        let err = result.expect_err(concat!("expected Err for: ", stringify!($expr)));
        let msg = err.to_string();
        assert!(msg.contains($substr), "expected error containing {:?}, got: {msg:?}", $substr);
    }};
}
