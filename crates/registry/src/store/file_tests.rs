// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn temp_store() -> anyhow::Result<(tempfile::TempDir, FileStore)> {
    let dir = tempfile::tempdir()?;
    let store = FileStore::new(dir.path().join("config.json"));
    Ok((dir, store))
}

#[test]
fn missing_file_is_empty_store() -> anyhow::Result<()> {
    let (_dir, store) = temp_store()?;
    assert_eq!(store.get("KeePassRPC.Key.alice")?, None);
    assert!(store.entries("KeePassRPC.Key.")?.is_empty());
    Ok(())
}

#[test]
fn set_get_and_delete_persist() -> anyhow::Result<()> {
    let (_dir, store) = temp_store()?;
    store.set("KeePassRPC.Key.alice", Some("blob-a"))?;
    store.set("KeePassRPC.Key.bob", Some("blob-b"))?;

    // A fresh handle sees what the first one wrote.
    let reopened = FileStore::new(store.path());
    assert_eq!(reopened.get("KeePassRPC.Key.alice")?.as_deref(), Some("blob-a"));

    reopened.set("KeePassRPC.Key.alice", None)?;
    assert_eq!(store.get("KeePassRPC.Key.alice")?, None);
    assert_eq!(store.entries("KeePassRPC.Key.")?, vec![("KeePassRPC.Key.bob".to_owned(), "blob-b".to_owned())]);
    Ok(())
}

#[test]
fn deleting_absent_key_does_not_create_file() -> anyhow::Result<()> {
    let (_dir, store) = temp_store()?;
    store.set("KeePassRPC.Key.ghost", None)?;
    assert!(!store.path().exists());
    Ok(())
}

#[test]
fn foreign_settings_survive_rewrites() -> anyhow::Result<()> {
    let (_dir, store) = temp_store()?;
    std::fs::write(
        store.path(),
        r#"{
            "KeePassRPC.webSocket.port": 12546,
            "KeePassRPC.KeeFox.autoCommit": true,
            "KeePassRPC.Key.alice": "blob-a"
        }"#,
    )?;

    store.set("KeePassRPC.Key.alice", None)?;

    let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(store.path())?)?;
    assert_eq!(raw["KeePassRPC.webSocket.port"], 12546);
    assert_eq!(raw["KeePassRPC.KeeFox.autoCommit"], true);
    assert!(raw.get("KeePassRPC.Key.alice").is_none());
    Ok(())
}

#[test]
fn entries_keep_file_order() -> anyhow::Result<()> {
    let (_dir, store) = temp_store()?;
    std::fs::write(
        store.path(),
        r#"{"KeePassRPC.Key.zed":"1","KeePassRPC.Key.amy":"2","KeePassRPC.Key.max":"3"}"#,
    )?;
    let users: Vec<_> = store.entries("KeePassRPC.Key.")?.into_iter().map(|(k, _)| k).collect();
    assert_eq!(users, ["KeePassRPC.Key.zed", "KeePassRPC.Key.amy", "KeePassRPC.Key.max"]);
    Ok(())
}

#[test]
fn null_value_reads_as_empty() -> anyhow::Result<()> {
    let (_dir, store) = temp_store()?;
    std::fs::write(store.path(), r#"{"KeePassRPC.Key.alice":null}"#)?;
    assert_eq!(store.get("KeePassRPC.Key.alice")?.as_deref(), Some(""));
    Ok(())
}

#[yare::parameterized(
    number = { "7", "7" },
    boolean = { "true", "true" },
    object = { r#"{"a": 1}"#, r#"{"a":1}"# },
)]
fn non_string_value_reads_as_json_text(stored: &str, expected: &str) {
    let (_dir, store) = temp_store().expect("tempdir");
    let contents = format!(r#"{{"KeePassRPC.Key.alice": "blob", "KeePassRPC.Key.bob": {stored}}}"#);
    std::fs::write(store.path(), contents).expect("write fixture");

    let entries = store.entries("KeePassRPC.Key.").expect("enumerate");
    assert_eq!(
        entries,
        [
            ("KeePassRPC.Key.alice".to_owned(), "blob".to_owned()),
            ("KeePassRPC.Key.bob".to_owned(), expected.to_owned()),
        ]
    );
    assert_eq!(store.get("KeePassRPC.Key.bob").expect("get").as_deref(), Some(expected));
}

#[yare::parameterized(
    not_json = { "this is not json" },
    not_an_object = { "[1, 2, 3]" },
)]
fn unreadable_contents_fail_enumeration(contents: &str) {
    let (_dir, store) = temp_store().expect("tempdir");
    std::fs::write(store.path(), contents).expect("write fixture");
    assert!(matches!(store.entries("KeePassRPC.Key."), Err(StoreError::Format(_))));
}

#[cfg(unix)]
#[test]
fn write_into_read_only_dir_fails() -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir()?;
    let locked = dir.path().join("locked");
    std::fs::create_dir(&locked)?;
    let store = FileStore::new(locked.join("config.json"));
    store.set("KeePassRPC.Key.alice", Some("blob"))?;

    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o500))?;
    let result = store.set("KeePassRPC.Key.alice", None);
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o700))?;

    // Root ignores directory permissions, so only assert when the write was refused.
    if let Err(e) = result {
        assert!(matches!(e, StoreError::Write(_)));
        assert_eq!(store.get("KeePassRPC.Key.alice")?.as_deref(), Some("blob"));
    }
    Ok(())
}
