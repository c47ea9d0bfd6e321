// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::store::DEFAULT_NAMESPACE;

/// Inspect and revoke the browser clients authorized against KeePassRPC.
#[derive(Debug, Parser)]
#[command(name = "authreg", version, about)]
pub struct Config {
    /// Path to the settings store holding credential grants.
    #[arg(long, env = "AUTHREG_STORE")]
    pub store: Option<PathBuf>,

    /// Key prefix owning the registry's entries in the store.
    #[arg(long, env = "AUTHREG_NAMESPACE", default_value = DEFAULT_NAMESPACE)]
    pub namespace: String,

    /// Path to the per-user protection key.
    #[arg(long, env = "AUTHREG_KEY_FILE")]
    pub key_file: Option<PathBuf>,

    /// Log format (json or text).
    #[arg(long, env = "AUTHREG_LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "AUTHREG_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// List authorized clients and whether they are connected
    List {
        /// Print a JSON array instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Revoke a client's authorization
    Revoke {
        /// Username the client authenticated as
        username: String,
    },
}

/// Directory for the store and key file when no explicit path is given.
pub fn state_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("AUTHREG_STATE_DIR") {
        return PathBuf::from(dir);
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return PathBuf::from(xdg).join("authreg");
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local/state/authreg");
    }
    PathBuf::from(".authreg")
}

impl Config {
    /// Validate the configuration after parsing.
    pub fn validate(&self) -> anyhow::Result<()> {
        let ns = &self.namespace;
        if ns.is_empty() {
            anyhow::bail!("--namespace must not be empty");
        }
        if ns.chars().any(char::is_whitespace) {
            anyhow::bail!("--namespace must not contain whitespace: {ns:?}");
        }
        if ns.ends_with('.') {
            anyhow::bail!("--namespace must not end with '.': {ns:?}");
        }
        match self.log_format.as_str() {
            "json" | "text" => {}
            other => anyhow::bail!("invalid log format: {other}"),
        }
        Ok(())
    }

    pub fn store_path(&self) -> PathBuf {
        self.store.clone().unwrap_or_else(|| state_dir().join("config.json"))
    }

    pub fn key_path(&self) -> PathBuf {
        self.key_file.clone().unwrap_or_else(|| state_dir().join("protect.key"))
    }

    /// Build a `Config` for tests with explicit paths.
    #[doc(hidden)]
    pub fn test(store: PathBuf, key_file: PathBuf, command: Command) -> Self {
        Self {
            store: Some(store),
            namespace: DEFAULT_NAMESPACE.into(),
            key_file: Some(key_file),
            log_format: "text".into(),
            log_level: "warn".into(),
            command,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
