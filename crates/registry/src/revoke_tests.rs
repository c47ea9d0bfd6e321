// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use super::*;
use crate::session::NoSessions;
use crate::store::MemoryStore;
use crate::test_support::{FakeSession, FakeSessions, FlakyStore, StoreBuilder};

fn keys() -> CredentialKeys {
    CredentialKeys::default()
}

#[test]
fn deletes_grant_and_closes_live_session() -> anyhow::Result<()> {
    let store = StoreBuilder::new().grant("alice", "Firefox").grant("bob", "Chrome").build();
    let alice = FakeSession::authenticated("alice");
    let bob = FakeSession::authenticated("bob");
    let sessions = FakeSessions::new(vec![Arc::clone(&bob), Arc::clone(&alice)]);

    let outcome = revoke(&store, sessions.as_ref(), &keys(), "alice")?;

    assert_eq!(outcome, RevokeOutcome { session_closed: true });
    assert_eq!(store.get("KeePassRPC.Key.alice")?, None);
    assert!(store.get("KeePassRPC.Key.bob")?.is_some());
    assert_eq!(alice.close_count(), 1);
    assert_eq!(bob.close_count(), 0);
    Ok(())
}

#[test]
fn no_live_session_still_succeeds() -> anyhow::Result<()> {
    let store = StoreBuilder::new().grant("bob", "Chrome").build();
    let outcome = revoke(&store, &NoSessions, &keys(), "bob")?;
    assert_eq!(outcome, RevokeOutcome { session_closed: false });
    assert!(store.is_empty());
    Ok(())
}

#[test]
fn store_failure_leaves_grant_and_session_alone() {
    let store =
        FlakyStore::new(StoreBuilder::new().grant("carol", "Edge").build()).failing_writes();
    let carol = FakeSession::authenticated("carol");
    let sessions = FakeSessions::new(vec![Arc::clone(&carol)]);

    let result = revoke(&store, sessions.as_ref(), &keys(), "carol");

    assert!(matches!(
        result,
        Err(RevocationError::StoreWriteFailed { ref username, .. }) if username == "carol"
    ));
    assert_eq!(carol.close_count(), 0);
    assert!(store.inner.get("KeePassRPC.Key.carol").ok().flatten().is_some());
}

#[test]
fn revoking_twice_is_idempotent() -> anyhow::Result<()> {
    let store = StoreBuilder::new().grant("alice", "Firefox").build();
    revoke(&store, &NoSessions, &keys(), "alice")?;
    let second = revoke(&store, &NoSessions, &keys(), "alice")?;
    assert_eq!(second, RevokeOutcome { session_closed: false });
    Ok(())
}

#[test]
fn unknown_username_succeeds() -> anyhow::Result<()> {
    let store = MemoryStore::new();
    revoke(&store, &NoSessions, &keys(), "nobody")?;
    Ok(())
}

#[test]
fn only_first_matching_session_is_closed() -> anyhow::Result<()> {
    let store = StoreBuilder::new().grant("alice", "Firefox").build();
    let first = FakeSession::authenticated("alice");
    let second = FakeSession::authenticated("alice");
    let sessions = FakeSessions::new(vec![Arc::clone(&first), Arc::clone(&second)]);

    revoke(&store, sessions.as_ref(), &keys(), "alice")?;
    assert_eq!(first.close_count(), 1);
    assert_eq!(second.close_count(), 0);
    Ok(())
}

#[test]
fn close_failure_is_swallowed() -> anyhow::Result<()> {
    let store = StoreBuilder::new().grant("alice", "Firefox").build();
    let closing = FakeSession::closing("alice");
    let sessions = FakeSessions::new(vec![Arc::clone(&closing)]);

    let outcome = revoke(&store, sessions.as_ref(), &keys(), "alice")?;
    assert_eq!(outcome, RevokeOutcome { session_closed: false });
    assert_eq!(closing.close_count(), 1);
    assert!(store.is_empty());
    Ok(())
}

#[test]
fn username_match_is_case_sensitive() -> anyhow::Result<()> {
    let store = StoreBuilder::new().grant("Alice", "Firefox").build();
    let lower = FakeSession::authenticated("alice");
    let sessions = FakeSessions::new(vec![Arc::clone(&lower)]);

    revoke(&store, sessions.as_ref(), &keys(), "Alice")?;
    assert_eq!(lower.close_count(), 0);
    Ok(())
}

#[test]
fn anonymous_sessions_are_never_closed() -> anyhow::Result<()> {
    let store = StoreBuilder::new().grant("alice", "Firefox").build();
    let anon = FakeSession::anonymous();
    let sessions = FakeSessions::new(vec![Arc::clone(&anon)]);

    revoke(&store, sessions.as_ref(), &keys(), "alice")?;
    assert_eq!(anon.close_count(), 0);
    Ok(())
}

#[test]
fn empty_username_is_rejected_before_any_write() {
    let store = StoreBuilder::new().raw("", "bare prefix value").build();
    assert_eq!(revoke(&store, &NoSessions, &keys(), ""), Err(RevocationError::InvalidUsername));
    assert_eq!(store.len(), 1);
}
