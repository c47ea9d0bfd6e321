// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Revocation: delete the stored grant, then close any live session.

use tracing::{debug, info, warn};

use crate::error::RevocationError;
use crate::session::LiveSessionSet;
use crate::store::{BlobStore, CredentialKeys};

/// Result of a successful revocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevokeOutcome {
    /// A live session for the username was found and told to close.
    pub session_closed: bool,
}

/// Revoke `username`'s grant.
///
/// The store delete must succeed before any session is touched; closing a
/// session while its grant survives would only disconnect the client. Session
/// close is best effort: a session that vanished or is already closing does
/// not fail the revocation.
pub fn revoke(
    store: &dyn BlobStore,
    sessions: &dyn LiveSessionSet,
    keys: &CredentialKeys,
    username: &str,
) -> Result<RevokeOutcome, RevocationError> {
    if username.is_empty() {
        return Err(RevocationError::InvalidUsername);
    }

    let key = keys.key_for(username);
    store.set(&key, None).map_err(|e| {
        warn!(username, err = %e, "credential delete failed, grant still in place");
        RevocationError::StoreWriteFailed { username: username.to_owned(), reason: e.to_string() }
    })?;
    info!(username, "credential deleted");

    let live = sessions.list();
    let Some(session) = live.iter().find(|s| s.username().as_deref() == Some(username)) else {
        debug!(username, "no live session to close");
        return Ok(RevokeOutcome { session_closed: false });
    };

    match session.close() {
        Ok(()) => {
            info!(username, "live session closed");
            Ok(RevokeOutcome { session_closed: true })
        }
        Err(e) => {
            debug!(username, err = %e, "live session close ignored");
            Ok(RevokeOutcome { session_closed: false })
        }
    }
}

#[cfg(test)]
#[path = "revoke_tests.rs"]
mod tests;
