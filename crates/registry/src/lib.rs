// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authorized client registry for the KeePassRPC server.
//!
//! Lists the browser clients that hold a stored grant, marks the ones that
//! are connected right now, and revokes a grant while closing the matching
//! live session.

pub mod codec;
pub mod config;
pub mod directory;
pub mod error;
pub mod protect;
pub mod reconcile;
pub mod record;
pub mod registry;
pub mod revoke;
pub mod run;
pub mod session;
pub mod store;
pub mod test_support;

pub use codec::CredentialCodec;
pub use error::{DecodeError, DirectoryError, RevocationError};
pub use reconcile::ReconciliationRow;
pub use record::CredentialRecord;
pub use registry::Registry;
pub use revoke::RevokeOutcome;
