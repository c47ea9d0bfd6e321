// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live session set: the clients currently connected to the RPC server.
//!
//! The connection layer owns sessions. The registry only takes a snapshot via
//! [`LiveSessionSet::list`] for the duration of one operation, reads
//! usernames, and asks a matching session to close.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use tracing::{debug, info};

use crate::error::SessionError;

/// One connected client.
pub trait LiveSession: Send + Sync {
    /// Authenticated username, or `None` before the client has authenticated.
    fn username(&self) -> Option<String>;

    /// Forcibly close the transport.
    fn close(&self) -> Result<(), SessionError>;
}

/// Source of live-session snapshots.
pub trait LiveSessionSet: Send + Sync {
    fn list(&self) -> Vec<Arc<dyn LiveSession>>;
}

/// A live-session set that is always empty, for tools running outside the
/// RPC server process.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSessions;

impl LiveSessionSet for NoSessions {
    fn list(&self) -> Vec<Arc<dyn LiveSession>> {
        Vec::new()
    }
}

/// Connection-layer handle for one session.
///
/// The connection task selects on [`SessionHandle::closed`] and tears the
/// transport down once it fires.
#[derive(Debug)]
pub struct SessionHandle {
    id: String,
    username: RwLock<Option<String>>,
    cancel: CancellationToken,
}

impl SessionHandle {
    fn new(id: String, cancel: CancellationToken) -> Self {
        Self { id, username: RwLock::new(None), cancel }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Record the username once the client has authenticated.
    pub fn authenticate(&self, username: impl Into<String>) {
        let username = username.into();
        debug!(session = %self.id, username = %username, "session authenticated");
        *self.username.write() = Some(username);
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves once the session has been asked to close.
    pub fn closed(&self) -> WaitForCancellationFuture<'_> {
        self.cancel.cancelled()
    }
}

impl LiveSession for SessionHandle {
    fn username(&self) -> Option<String> {
        self.username.read().clone()
    }

    fn close(&self) -> Result<(), SessionError> {
        if self.cancel.is_cancelled() {
            return Err(SessionError::AlreadyClosed);
        }
        self.cancel.cancel();
        info!(session = %self.id, "session closed");
        Ok(())
    }
}

/// In-process [`LiveSessionSet`] fed by the connection layer.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: RwLock<IndexMap<String, Arc<SessionHandle>>>,
    shutdown: CancellationToken,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(CancellationToken::new())
    }
}

impl SessionRegistry {
    /// Session tokens are children of `shutdown`, so cancelling it closes
    /// every session.
    pub fn new(shutdown: CancellationToken) -> Self {
        Self { sessions: RwLock::new(IndexMap::new()), shutdown }
    }

    /// Register a newly accepted connection under a fresh id.
    pub fn register(&self) -> Arc<SessionHandle> {
        self.register_with_id(uuid::Uuid::new_v4().to_string())
    }

    pub fn register_with_id(&self, id: impl Into<String>) -> Arc<SessionHandle> {
        let id = id.into();
        let handle = Arc::new(SessionHandle::new(id.clone(), self.shutdown.child_token()));
        self.sessions.write().insert(id, Arc::clone(&handle));
        handle
    }

    /// Drop a session after its transport went away.
    pub fn remove(&self, id: &str) -> Option<Arc<SessionHandle>> {
        self.sessions.write().shift_remove(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

impl LiveSessionSet for SessionRegistry {
    fn list(&self) -> Vec<Arc<dyn LiveSession>> {
        self.sessions.read().values().map(|h| Arc::clone(h) as Arc<dyn LiveSession>).collect()
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
