// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::Parser;
use serial_test::serial;

use super::{state_dir, Command, Config};

fn parse(args: &[&str]) -> Config {
    Config::parse_from(args)
}

/// Run `f` with the state-dir variables set as given, restoring them after.
fn with_env(vars: &[(&str, Option<&str>)], f: impl FnOnce()) {
    let saved: Vec<_> = vars.iter().map(|(k, _)| (*k, std::env::var_os(k))).collect();
    for (k, v) in vars {
        match v {
            Some(v) => std::env::set_var(k, v),
            None => std::env::remove_var(k),
        }
    }
    f();
    for (k, v) in saved {
        match v {
            Some(v) => std::env::set_var(k, v),
            None => std::env::remove_var(k),
        }
    }
}

#[test]
#[serial]
fn list_with_defaults() -> anyhow::Result<()> {
    let config = parse(&["authreg", "list"]);
    config.validate()?;
    assert_eq!(config.namespace, "KeePassRPC");
    assert_eq!(config.log_format, "text");
    assert_eq!(config.command, Command::List { json: false });
    Ok(())
}

#[test]
fn revoke_takes_username() -> anyhow::Result<()> {
    let config = parse(&["authreg", "--namespace", "Other", "revoke", "alice"]);
    config.validate()?;
    assert_eq!(config.command, Command::Revoke { username: "alice".into() });
    assert_eq!(config.namespace, "Other");
    Ok(())
}

#[test]
fn list_json_flag() {
    let config = parse(&["authreg", "list", "--json"]);
    assert_eq!(config.command, Command::List { json: true });
}

#[test]
fn missing_subcommand_is_a_usage_error() {
    assert!(Config::try_parse_from(["authreg"]).is_err());
}

#[yare::parameterized(
    empty       = { "", "must not be empty" },
    space       = { "Kee Pass", "whitespace" },
    tab         = { "KeePass\tRPC", "whitespace" },
    trailing    = { "KeePassRPC.", "end with '.'" },
)]
fn invalid_namespace(namespace: &str, expected_substr: &str) {
    let config = parse(&["authreg", "--namespace", namespace, "list"]);
    crate::assert_err_contains!(config.validate(), expected_substr);
}

#[test]
fn invalid_log_format() {
    let config = parse(&["authreg", "--log-format", "xml", "list"]);
    crate::assert_err_contains!(config.validate(), "invalid log format");
}

#[test]
fn explicit_paths_win() {
    let config = parse(&["authreg", "--store", "/tmp/s.json", "--key-file", "/tmp/k", "list"]);
    assert_eq!(config.store_path(), PathBuf::from("/tmp/s.json"));
    assert_eq!(config.key_path(), PathBuf::from("/tmp/k"));
}

#[test]
#[serial]
fn state_dir_override() {
    with_env(&[("AUTHREG_STATE_DIR", Some("/srv/authreg")), ("XDG_STATE_HOME", Some("/xdg"))], || {
        assert_eq!(state_dir(), PathBuf::from("/srv/authreg"));
        let config = parse(&["authreg", "list"]);
        assert_eq!(config.store_path(), PathBuf::from("/srv/authreg/config.json"));
        assert_eq!(config.key_path(), PathBuf::from("/srv/authreg/protect.key"));
    });
}

#[test]
#[serial]
fn state_dir_from_xdg() {
    with_env(&[("AUTHREG_STATE_DIR", None), ("XDG_STATE_HOME", Some("/xdg"))], || {
        assert_eq!(state_dir(), PathBuf::from("/xdg/authreg"));
    });
}

#[test]
#[serial]
fn state_dir_from_home() {
    with_env(
        &[("AUTHREG_STATE_DIR", None), ("XDG_STATE_HOME", None), ("HOME", Some("/home/u"))],
        || {
            assert_eq!(state_dir(), PathBuf::from("/home/u/.local/state/authreg"));
        },
    );
}
