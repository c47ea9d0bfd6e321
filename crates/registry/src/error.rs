// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for the registry.
//!
//! Store, protection and decoding failures are converted into these types
//! before they reach a caller. Each error exposes a stable code via `as_str`
//! and the process exit status the operator CLI uses for it.

use std::fmt;

/// Failure decoding a single stored credential blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The stored value is absent or the empty string.
    Empty,
    /// Neither protected nor legacy decoding produced a usable record.
    Malformed,
}

impl DecodeError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "EMPTY",
            Self::Malformed => "MALFORMED",
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for DecodeError {}

/// Failure enumerating the authorized client directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// The directory cannot be trusted; callers must not render a partial list.
    Unavailable { reason: String },
}

impl DirectoryError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unavailable { .. } => "UNAVAILABLE",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Unavailable { .. } => 3,
        }
    }
}

impl fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { reason } => write!(f, "{}: {reason}", self.as_str()),
        }
    }
}

impl std::error::Error for DirectoryError {}

/// Failure revoking a client. The stored grant is still in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevocationError {
    /// An empty username never names a stored grant.
    InvalidUsername,
    /// Deleting the stored credential failed; no session was touched.
    StoreWriteFailed { username: String, reason: String },
}

impl RevocationError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidUsername => "INVALID_USERNAME",
            Self::StoreWriteFailed { .. } => "STORE_WRITE_FAILED",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidUsername => 2,
            Self::StoreWriteFailed { .. } => 1,
        }
    }
}

impl fmt::Display for RevocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUsername => write!(f, "{}: username must not be empty", self.as_str()),
            Self::StoreWriteFailed { username, reason } => {
                write!(f, "{}: could not delete credential for {username}: {reason}", self.as_str())
            }
        }
    }
}

impl std::error::Error for RevocationError {}

/// Failure of the backing credential blob store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be read or introspected.
    Read(String),
    /// The store contents are not a key/value document.
    Format(String),
    /// A mutation could not be persisted.
    Write(String),
}

impl StoreError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read(_) => "STORE_READ",
            Self::Format(_) => "STORE_FORMAT",
            Self::Write(_) => "STORE_WRITE",
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(msg) | Self::Format(msg) | Self::Write(msg) => {
                write!(f, "{}: {msg}", self.as_str())
            }
        }
    }
}

impl std::error::Error for StoreError {}

/// Failure of the user-scoped data protection primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtectError {
    /// No protection key exists for the current user.
    KeyUnavailable,
    /// The key file exists but is not usable key material.
    InvalidKey(String),
    /// Ciphertext is truncated, tampered with, or bound to other entropy.
    Unprotect,
    /// Sealing failed (randomness or cipher failure).
    Protect,
    Io(String),
}

impl ProtectError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KeyUnavailable => "KEY_UNAVAILABLE",
            Self::InvalidKey(_) => "INVALID_KEY",
            Self::Unprotect => "UNPROTECT_FAILED",
            Self::Protect => "PROTECT_FAILED",
            Self::Io(_) => "IO",
        }
    }
}

impl fmt::Display for ProtectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidKey(msg) | Self::Io(msg) => write!(f, "{}: {msg}", self.as_str()),
            _ => f.write_str(self.as_str()),
        }
    }
}

impl std::error::Error for ProtectError {}

/// Failure producing a protected credential blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The record has no username and could never be looked up.
    EmptyUsername,
    Serialize(String),
    Protect(ProtectError),
}

impl EncodeError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyUsername => "EMPTY_USERNAME",
            Self::Serialize(_) => "SERIALIZE",
            Self::Protect(_) => "PROTECT",
        }
    }
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => f.write_str(self.as_str()),
            Self::Serialize(msg) => write!(f, "{}: {msg}", self.as_str()),
            Self::Protect(e) => write!(f, "{}: {e}", self.as_str()),
        }
    }
}

impl std::error::Error for EncodeError {}

impl From<ProtectError> for EncodeError {
    fn from(e: ProtectError) -> Self {
        Self::Protect(e)
    }
}

/// Failure closing a live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// The transport was already closed or is closing.
    AlreadyClosed,
}

impl SessionError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AlreadyClosed => "ALREADY_CLOSED",
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for SessionError {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
