// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The authorized client registry: the surface a UI or CLI talks to.

use std::sync::Arc;

use crate::codec::CredentialCodec;
use crate::directory;
use crate::error::{DirectoryError, RevocationError};
use crate::protect::DataProtector;
use crate::reconcile::{self, ReconciliationRow};
use crate::record::CredentialRecord;
use crate::revoke::{self, RevokeOutcome};
use crate::session::LiveSessionSet;
use crate::store::{BlobStore, CredentialKeys};

/// Stored grants joined with live sessions, plus revocation.
pub struct Registry {
    store: Arc<dyn BlobStore>,
    sessions: Arc<dyn LiveSessionSet>,
    codec: CredentialCodec,
    keys: CredentialKeys,
}

impl Registry {
    pub fn new(
        store: Arc<dyn BlobStore>,
        sessions: Arc<dyn LiveSessionSet>,
        protector: Arc<dyn DataProtector>,
        namespace: &str,
    ) -> Self {
        Self {
            store,
            sessions,
            codec: CredentialCodec::new(protector),
            keys: CredentialKeys::new(namespace),
        }
    }

    pub fn codec(&self) -> &CredentialCodec {
        &self.codec
    }

    pub fn keys(&self) -> &CredentialKeys {
        &self.keys
    }

    /// Every decodable stored grant, in store order.
    pub fn list_all(&self) -> Result<Vec<CredentialRecord>, DirectoryError> {
        directory::list_all(self.store.as_ref(), &self.codec, &self.keys)
    }

    /// Stored grants marked with whether their client is connected.
    ///
    /// The live-session snapshot is taken after the directory is read and is
    /// not kept.
    pub fn list_authorized_clients(&self) -> Result<Vec<ReconciliationRow>, DirectoryError> {
        let records = self.list_all()?;
        let live = reconcile::live_usernames(self.sessions.as_ref());
        Ok(reconcile::reconcile(records, &live))
    }

    pub fn revoke_client(&self, username: &str) -> Result<RevokeOutcome, RevocationError> {
        revoke::revoke(self.store.as_ref(), self.sessions.as_ref(), &self.keys, username)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
