// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `authreg` subcommands: build a registry from [`Config`] and report.

use std::io::{self, Write};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::{Command, Config};
use crate::protect::UserKeyProtector;
use crate::reconcile::ReconciliationRow;
use crate::registry::Registry;
use crate::session::NoSessions;
use crate::store::FileStore;

/// Exit status for usage and configuration errors.
pub const EXIT_USAGE: i32 = 2;

/// Install the stderr log subscriber. Safe to call more than once.
pub fn init_tracing(config: &Config) {
    use tracing_subscriber::fmt;

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));

    let result = match config.log_format.as_str() {
        "json" => fmt::fmt().with_env_filter(filter).with_writer(io::stderr).json().try_init(),
        _ => fmt::fmt().with_env_filter(filter).with_writer(io::stderr).try_init(),
    };
    drop(result);
}

/// Load the protection key named by the config.
pub fn load_protector(config: &Config) -> anyhow::Result<UserKeyProtector> {
    let key_path = config.key_path();
    UserKeyProtector::open(&key_path)
        .map_err(|e| anyhow::anyhow!("key file {}: {e}", key_path.display()))
}

/// Open the registry the config points at.
///
/// The CLI is not the RPC server, so it never sees live sessions.
pub fn open_registry(config: &Config, protector: UserKeyProtector) -> Registry {
    let store_path = config.store_path();
    debug!(store = %store_path.display(), has_key = protector.has_key(), "opening registry");
    Registry::new(
        Arc::new(FileStore::new(store_path)),
        Arc::new(NoSessions),
        Arc::new(protector),
        &config.namespace,
    )
}

/// Run the configured subcommand, writing results to stdout.
pub fn run(config: &Config) -> i32 {
    let stdout = io::stdout();
    execute(config, &mut stdout.lock())
}

/// Run the configured subcommand against `out` and return the exit status.
pub fn execute(config: &Config, out: &mut dyn Write) -> i32 {
    match &config.command {
        Command::List { json } => {
            let protector = match load_protector(config) {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("error: {e:#}");
                    return EXIT_USAGE;
                }
            };
            if !protector.has_key() {
                eprintln!(
                    "warning: no protection key at {}; protected grants cannot be read and are not listed",
                    config.key_path().display()
                );
            }
            list(&open_registry(config, protector), *json, out)
        }
        // Revocation only deletes the stored grant and never needs the key.
        Command::Revoke { username } => {
            revoke(&open_registry(config, UserKeyProtector::without_key()), username, out)
        }
    }
}

fn list(registry: &Registry, json: bool, out: &mut dyn Write) -> i32 {
    let rows = match registry.list_authorized_clients() {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("error: authorized clients cannot be listed: {e}");
            return e.exit_code();
        }
    };

    let now = Utc::now();
    let written = if json { print_json(out, &rows, now) } else { print_table(out, &rows, now) };
    match written {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("error: write failed: {e}");
            1
        }
    }
}

fn revoke(registry: &Registry, username: &str, out: &mut dyn Write) -> i32 {
    match registry.revoke_client(username) {
        Ok(outcome) => {
            let note = if outcome.session_closed { " (live session closed)" } else { "" };
            // The revocation already happened; a failed write does not undo it.
            drop(writeln!(out, "revoked \"{username}\"{note}"));
            0
        }
        Err(e) => {
            eprintln!("error: {e}");
            e.exit_code()
        }
    }
}

/// JSON form of a row. Opaque material is never printed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClientView<'a> {
    client_name: &'a str,
    username: &'a str,
    auth_expires: DateTime<Utc>,
    expired: bool,
    connected: bool,
}

impl<'a> ClientView<'a> {
    fn new(row: &'a ReconciliationRow, now: DateTime<Utc>) -> Self {
        Self {
            client_name: &row.record.client_name,
            username: &row.record.username,
            auth_expires: row.record.auth_expires,
            expired: row.record.is_expired_at(now),
            connected: row.connected,
        }
    }
}

fn print_json(out: &mut dyn Write, rows: &[ReconciliationRow], now: DateTime<Utc>) -> io::Result<()> {
    let views: Vec<_> = rows.iter().map(|r| ClientView::new(r, now)).collect();
    serde_json::to_writer_pretty(&mut *out, &views)?;
    writeln!(out)
}

fn format_expires(row: &ReconciliationRow, now: DateTime<Utc>) -> String {
    let at = row.record.auth_expires.format("%Y-%m-%d %H:%M UTC");
    if row.record.is_expired_at(now) {
        format!("{at} (expired)")
    } else {
        at.to_string()
    }
}

fn print_table(out: &mut dyn Write, rows: &[ReconciliationRow], now: DateTime<Utc>) -> io::Result<()> {
    if rows.is_empty() {
        return writeln!(out, "no authorized clients");
    }

    // Padding counts chars, so widths must too.
    let width = |s: &str| s.chars().count();
    let client_w = rows.iter().map(|r| width(&r.record.client_name)).max().unwrap_or(0).max(6);
    let user_w = rows.iter().map(|r| width(&r.record.username)).max().unwrap_or(0).max(8);
    let expires: Vec<_> = rows.iter().map(|r| format_expires(r, now)).collect();
    let exp_w = expires.iter().map(|e| width(e)).max().unwrap_or(0).max(7);

    writeln!(out, "{:<client_w$}  {:<user_w$}  {:<exp_w$}  CONNECTED", "CLIENT", "USERNAME", "EXPIRES")?;
    for (row, expires) in rows.iter().zip(&expires) {
        let connected = if row.connected { "yes" } else { "no" };
        writeln!(
            out,
            "{:<client_w$}  {:<user_w$}  {:<exp_w$}  {connected}",
            row.record.client_name, row.record.username, expires
        )?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
