// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential blob codec.
//!
//! A stored value is tried against an ordered list of [`DecodeStrategy`]s and
//! the first success wins:
//!
//! 1. [`ProtectedStrategy`]: base64, then user-scoped unprotect with
//!    [`ENTROPY`], then the JSON document.
//! 2. [`LegacyStrategy`]: base64 straight to the JSON document. Covers grants
//!    written before protection was introduced.
//!
//! New blobs are always written through the protected path ([`CredentialCodec::encode`]).

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::debug;

use crate::error::{DecodeError, EncodeError};
use crate::protect::DataProtector;
use crate::record::CredentialRecord;

/// Auxiliary entropy bound into every protected blob. Changing it makes every
/// previously paired client unreadable.
pub const ENTROPY: [u8; 5] = [172, 218, 37, 36, 15];

/// Why a single strategy could not decode a blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyError {
    Base64,
    Unprotect,
    Document(String),
    EmptyUsername,
}

impl std::fmt::Display for StrategyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Base64 => f.write_str("invalid base64"),
            Self::Unprotect => f.write_str("unprotect failed"),
            Self::Document(e) => write!(f, "invalid document: {e}"),
            Self::EmptyUsername => f.write_str("document has empty username"),
        }
    }
}

/// One way of turning a stored value into a record.
pub trait DecodeStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn decode(&self, raw: &str) -> Result<CredentialRecord, StrategyError>;
}

/// base64 → unprotect(ENTROPY) → document.
pub struct ProtectedStrategy {
    protector: Arc<dyn DataProtector>,
}

impl ProtectedStrategy {
    pub fn new(protector: Arc<dyn DataProtector>) -> Self {
        Self { protector }
    }
}

impl DecodeStrategy for ProtectedStrategy {
    fn name(&self) -> &'static str {
        "protected"
    }

    fn decode(&self, raw: &str) -> Result<CredentialRecord, StrategyError> {
        let sealed = STANDARD.decode(raw).map_err(|_| StrategyError::Base64)?;
        let plain =
            self.protector.unprotect(&sealed, &ENTROPY).map_err(|_| StrategyError::Unprotect)?;
        parse_document(&plain)
    }
}

/// base64 → document, no protection.
pub struct LegacyStrategy;

impl DecodeStrategy for LegacyStrategy {
    fn name(&self) -> &'static str {
        "legacy"
    }

    fn decode(&self, raw: &str) -> Result<CredentialRecord, StrategyError> {
        let plain = STANDARD.decode(raw).map_err(|_| StrategyError::Base64)?;
        parse_document(&plain)
    }
}

fn parse_document(bytes: &[u8]) -> Result<CredentialRecord, StrategyError> {
    let record: CredentialRecord =
        serde_json::from_slice(bytes).map_err(|e| StrategyError::Document(e.to_string()))?;
    if record.username.is_empty() {
        return Err(StrategyError::EmptyUsername);
    }
    Ok(record)
}

/// Decodes stored credential blobs and encodes new ones.
pub struct CredentialCodec {
    protector: Arc<dyn DataProtector>,
    strategies: Vec<Box<dyn DecodeStrategy>>,
}

impl CredentialCodec {
    /// Protected decoding first, legacy fallback second.
    pub fn new(protector: Arc<dyn DataProtector>) -> Self {
        let strategies: Vec<Box<dyn DecodeStrategy>> =
            vec![Box::new(ProtectedStrategy::new(Arc::clone(&protector))), Box::new(LegacyStrategy)];
        Self { protector, strategies }
    }

    /// Names of the decode strategies in the order they are tried.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn decode(&self, raw: Option<&str>) -> Result<CredentialRecord, DecodeError> {
        let raw = match raw {
            Some(r) if !r.is_empty() => r,
            _ => return Err(DecodeError::Empty),
        };

        for strategy in &self.strategies {
            match strategy.decode(raw) {
                Ok(record) => return Ok(record),
                Err(e) => debug!(strategy = strategy.name(), err = %e, "decode strategy failed"),
            }
        }
        Err(DecodeError::Malformed)
    }

    /// Produce the protected blob for `record`.
    pub fn encode(&self, record: &CredentialRecord) -> Result<String, EncodeError> {
        if record.username.is_empty() {
            return Err(EncodeError::EmptyUsername);
        }
        let doc = serde_json::to_vec(record).map_err(|e| EncodeError::Serialize(e.to_string()))?;
        let sealed = self.protector.protect(&doc, &ENTROPY)?;
        Ok(STANDARD.encode(sealed))
    }
}

/// Encode `record` the way grants were written before protection existed.
pub fn encode_legacy(record: &CredentialRecord) -> Result<String, EncodeError> {
    let doc = serde_json::to_vec(record).map_err(|e| EncodeError::Serialize(e.to_string()))?;
    Ok(STANDARD.encode(doc))
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
