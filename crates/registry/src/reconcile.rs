// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Join stored grants with live sessions for display.

use std::collections::HashSet;

use crate::record::CredentialRecord;
use crate::session::LiveSessionSet;

/// A stored grant and whether its client is connected right now.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationRow {
    pub record: CredentialRecord,
    pub connected: bool,
}

/// Usernames of authenticated live sessions. Sessions that have not
/// authenticated yet carry no username and are skipped.
pub fn live_usernames(sessions: &dyn LiveSessionSet) -> HashSet<String> {
    sessions.list().iter().filter_map(|s| s.username()).filter(|u| !u.is_empty()).collect()
}

/// Mark each record connected iff its username is in `live`.
///
/// Matching is exact and case-sensitive. Live usernames with no stored grant
/// produce no row.
pub fn reconcile(records: Vec<CredentialRecord>, live: &HashSet<String>) -> Vec<ReconciliationRow> {
    records
        .into_iter()
        .map(|record| {
            let connected = live.contains(&record.username);
            ReconciliationRow { record, connected }
        })
        .collect()
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
