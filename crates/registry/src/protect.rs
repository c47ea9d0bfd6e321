// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-scoped local data protection.
//!
//! Protected blobs are only readable by the OS account that wrote them: the
//! sealing key lives in a key file only that user can read. The auxiliary
//! entropy tag is bound into every ciphertext as AEAD associated data, so a
//! blob sealed under one tag never opens under another.

use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use tracing::{debug, info, warn};

use crate::error::ProtectError;

/// Ciphertext layout version.
const FORMAT_V1: u8 = 1;

/// AES-256 key length.
pub const KEY_LEN: usize = 32;

/// Seal/unseal primitive scoped to the running OS user.
pub trait DataProtector: Send + Sync {
    fn protect(&self, plaintext: &[u8], entropy: &[u8]) -> Result<Vec<u8>, ProtectError>;
    fn unprotect(&self, ciphertext: &[u8], entropy: &[u8]) -> Result<Vec<u8>, ProtectError>;
}

/// AES-256-GCM protector keyed from a per-user key file.
///
/// Ciphertext is `version || nonce || sealed`, where `sealed` carries the tag.
pub struct UserKeyProtector {
    key: Option<LessSafeKey>,
    rng: SystemRandom,
}

impl std::fmt::Debug for UserKeyProtector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserKeyProtector").field("has_key", &self.key.is_some()).finish()
    }
}

impl UserKeyProtector {
    pub fn from_key_bytes(bytes: &[u8]) -> Result<Self, ProtectError> {
        if bytes.len() != KEY_LEN {
            return Err(ProtectError::InvalidKey(format!(
                "expected {KEY_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        let unbound = UnboundKey::new(&AES_256_GCM, bytes)
            .map_err(|_| ProtectError::InvalidKey("rejected by cipher".to_owned()))?;
        Ok(Self { key: Some(LessSafeKey::new(unbound)), rng: SystemRandom::new() })
    }

    /// A protector with no key. Every `unprotect` fails, so decoding falls
    /// through to the legacy path.
    pub fn without_key() -> Self {
        Self { key: None, rng: SystemRandom::new() }
    }

    /// Open the key file at `path`. A missing or blank file yields a keyless
    /// protector.
    pub fn open(path: &Path) -> Result<Self, ProtectError> {
        match read_key_text(path)? {
            Some(text) => Self::from_key_text(&text),
            None => {
                debug!(path = %path.display(), "no protection key, protected blobs unreadable");
                Ok(Self::without_key())
            }
        }
    }

    /// Open the key file at `path`, generating a fresh key if none exists.
    ///
    /// The key is written to a temp file and linked into place, so the key
    /// file is never observed half written. A blank key file left by an
    /// earlier crash is replaced.
    pub fn load_or_create(path: &Path) -> Result<Self, ProtectError> {
        static COUNTER: AtomicU32 = AtomicU32::new(0);

        let io_err = |p: &Path, e: std::io::Error| ProtectError::Io(format!("{}: {e}", p.display()));

        if let Some(text) = read_key_text(path)? {
            return Self::from_key_text(&text);
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }

        let rng = SystemRandom::new();
        let mut key = [0u8; KEY_LEN];
        rng.fill(&mut key).map_err(|_| ProtectError::Protect)?;

        let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
        let tmp_name = format!(
            "{}.{}.{}.tmp",
            path.file_name().unwrap_or_default().to_string_lossy(),
            std::process::id(),
            seq,
        );
        let tmp_path = path.with_file_name(tmp_name);
        let written = create_user_only(&tmp_path).and_then(|mut file| {
            file.write_all(STANDARD.encode(key).as_bytes())?;
            file.sync_all()
        });
        if let Err(e) = written {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(io_err(&tmp_path, e));
        }

        let linked = match std::fs::hard_link(&tmp_path, path) {
            Ok(()) => Ok(true),
            // Another writer got there first; use its key unless it is blank.
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                match read_key_text(path) {
                    Ok(Some(_)) => Ok(false),
                    Ok(None) => {
                        warn!(path = %path.display(), "replacing blank protection key file");
                        std::fs::rename(&tmp_path, path).map(|()| true).map_err(|e| io_err(path, e))
                    }
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(io_err(path, e)),
        };
        let _ = std::fs::remove_file(&tmp_path);

        if linked? {
            info!(path = %path.display(), "generated protection key");
            Self::from_key_bytes(&key)
        } else {
            Self::open(path)
        }
    }

    fn from_key_text(text: &str) -> Result<Self, ProtectError> {
        let bytes = STANDARD
            .decode(text)
            .map_err(|e| ProtectError::InvalidKey(format!("key file is not base64: {e}")))?;
        Self::from_key_bytes(&bytes)
    }

    pub fn has_key(&self) -> bool {
        self.key.is_some()
    }
}

impl DataProtector for UserKeyProtector {
    fn protect(&self, plaintext: &[u8], entropy: &[u8]) -> Result<Vec<u8>, ProtectError> {
        let key = self.key.as_ref().ok_or(ProtectError::KeyUnavailable)?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        self.rng.fill(&mut nonce_bytes).map_err(|_| ProtectError::Protect)?;
        let nonce =
            Nonce::try_assume_unique_for_key(&nonce_bytes).map_err(|_| ProtectError::Protect)?;

        let mut sealed = plaintext.to_vec();
        key.seal_in_place_append_tag(nonce, Aad::from(entropy), &mut sealed)
            .map_err(|_| ProtectError::Protect)?;

        let mut out = Vec::with_capacity(1 + NONCE_LEN + sealed.len());
        out.push(FORMAT_V1);
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&sealed);
        Ok(out)
    }

    fn unprotect(&self, ciphertext: &[u8], entropy: &[u8]) -> Result<Vec<u8>, ProtectError> {
        let key = self.key.as_ref().ok_or(ProtectError::KeyUnavailable)?;

        let (&version, rest) = ciphertext.split_first().ok_or(ProtectError::Unprotect)?;
        if version != FORMAT_V1 || rest.len() < NONCE_LEN + AES_256_GCM.tag_len() {
            return Err(ProtectError::Unprotect);
        }
        let (nonce_bytes, sealed) = rest.split_at(NONCE_LEN);
        let nonce =
            Nonce::try_assume_unique_for_key(nonce_bytes).map_err(|_| ProtectError::Unprotect)?;

        let mut buf = sealed.to_vec();
        let plain = key
            .open_in_place(nonce, Aad::from(entropy), &mut buf)
            .map_err(|_| ProtectError::Unprotect)?;
        Ok(plain.to_vec())
    }
}

/// Trimmed key file contents, or `None` when the file is missing or blank.
fn read_key_text(path: &Path) -> Result<Option<String>, ProtectError> {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            let text = text.trim();
            Ok((!text.is_empty()).then(|| text.to_owned()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ProtectError::Io(format!("{}: {e}", path.display()))),
    }
}

#[cfg(unix)]
fn create_user_only(path: &Path) -> std::io::Result<std::fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    std::fs::OpenOptions::new().write(true).create_new(true).mode(0o600).open(path)
}

#[cfg(not(unix))]
fn create_user_only(path: &Path) -> std::io::Result<std::fs::File> {
    std::fs::OpenOptions::new().write(true).create_new(true).open(path)
}

#[cfg(test)]
#[path = "protect_tests.rs"]
mod tests;
