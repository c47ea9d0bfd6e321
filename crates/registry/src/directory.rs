// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authorized client directory: every stored grant that decodes.

use tracing::{debug, warn};

use crate::codec::CredentialCodec;
use crate::error::{DecodeError, DirectoryError};
use crate::record::CredentialRecord;
use crate::store::{BlobStore, CredentialKeys};

/// Enumerate stored grants in store order.
///
/// A corrupt entry is skipped. An empty entry, or a store that cannot be
/// enumerated, makes the whole directory unavailable: a list missing grants
/// the operator cannot see is worse than no list.
pub fn list_all(
    store: &dyn BlobStore,
    codec: &CredentialCodec,
    keys: &CredentialKeys,
) -> Result<Vec<CredentialRecord>, DirectoryError> {
    let entries = store.entries(keys.prefix()).map_err(|e| {
        warn!(err = %e, "credential store could not be enumerated");
        DirectoryError::Unavailable { reason: e.to_string() }
    })?;

    let mut records = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        let Some(suffix) = keys.username_of(&key) else {
            continue;
        };
        match codec.decode(Some(&value)) {
            Ok(record) => {
                if record.username != suffix {
                    warn!(
                        key_username = suffix,
                        record_username = %record.username,
                        "credential stored under another username"
                    );
                }
                records.push(record);
            }
            Err(DecodeError::Empty) => {
                warn!(username = suffix, "empty credential value, directory unavailable");
                return Err(DirectoryError::Unavailable {
                    reason: format!("empty credential value for {suffix:?}"),
                });
            }
            Err(DecodeError::Malformed) => {
                warn!(username = suffix, "skipping undecodable credential");
            }
        }
    }

    debug!(count = records.len(), "authorized clients enumerated");
    Ok(records)
}

#[cfg(test)]
#[path = "directory_tests.rs"]
mod tests;
