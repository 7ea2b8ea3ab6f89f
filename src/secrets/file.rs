// Shopline CLI — File secret backend
//
// Fallback for hosts without a usable platform keyring (headless Linux,
// containers, CI). Entries live in one JSON document with 0600 permissions.
// Each value is sealed with AES-256-GCM under a key derived from the
// passphrase with Argon2id; the entry name is bound in as associated data.
//
// Writers take an exclusive lock on a sibling lock file for the whole
// read-modify-write, then replace the document through a temp file in the
// same directory.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use argon2::{Algorithm, Argon2, Params, Version};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use zeroize::Zeroizing;

use super::{BackendError, SecretBackend};
use crate::config::ENV_KEYRING_PASSPHRASE;

const FILE_NAME: &str = "credentials.json";
const LOCK_NAME: &str = "credentials.lock";
const FORMAT_VERSION: u32 = 1;

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;

/// Sealed under the derived key so a wrong passphrase fails on open.
const CHECK_PLAINTEXT: &[u8] = b"shopline-cli credentials";
const CHECK_AAD: &[u8] = b"__check__";

/// Argon2id cost parameters, recorded in the document so a file stays
/// readable if the defaults change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    pub m_cost: u32,
    pub t_cost: u32,
    pub p_cost: u32,
}

impl Default for KdfParams {
    /// 19 MiB, 2 passes, 1 lane.
    fn default() -> Self {
        Self {
            m_cost: 19_456,
            t_cost: 2,
            p_cost: 1,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Document {
    version: u32,
    kdf: KdfParams,
    salt: String,
    check: String,
    /// Entry name -> base64(nonce || ciphertext).
    entries: BTreeMap<String, String>,
}

pub struct FileBackend {
    dir: PathBuf,
    path: PathBuf,
    lock_path: PathBuf,
    salt: String,
    cipher: Aes256Gcm,
}

impl FileBackend {
    /// Open (creating it if needed) the file backend in `dir`.
    pub fn open(dir: &Path, passphrase: &str) -> Result<Self, BackendError> {
        Self::open_with(dir, passphrase, KdfParams::default())
    }

    /// Like [`FileBackend::open`]; `kdf` only applies when the file is new.
    pub fn open_with(dir: &Path, passphrase: &str, kdf: KdfParams) -> Result<Self, BackendError> {
        fs::create_dir_all(dir).map_err(|e| {
            BackendError::Unavailable(format!("failed to create {}: {}", dir.display(), e))
        })?;
        let path = dir.join(FILE_NAME);
        let lock_path = dir.join(LOCK_NAME);

        let _lock = lock(&lock_path, true)?;
        let (doc, cipher) = match read_document(&path)? {
            Some(doc) => {
                let cipher = derive_cipher(passphrase, &doc.salt, doc.kdf)?;
                unseal(&cipher, CHECK_AAD, &doc.check).map_err(|_| {
                    BackendError::Unavailable(format!(
                        "failed to decrypt {}; check {}",
                        path.display(),
                        ENV_KEYRING_PASSPHRASE
                    ))
                })?;
                (doc, cipher)
            }
            None => {
                let mut salt = [0u8; SALT_LEN];
                rand::rng().fill_bytes(&mut salt);
                let salt = STANDARD.encode(salt);
                let cipher = derive_cipher(passphrase, &salt, kdf)?;
                let doc = Document {
                    version: FORMAT_VERSION,
                    kdf,
                    check: seal(&cipher, CHECK_AAD, CHECK_PLAINTEXT)?,
                    salt,
                    entries: BTreeMap::new(),
                };
                write_document(dir, &path, &doc)?;
                (doc, cipher)
            }
        };

        tracing::debug!(path = %path.display(), entries = doc.entries.len(), "Opened file credential backend");
        Ok(Self {
            dir: dir.to_path_buf(),
            path,
            lock_path,
            salt: doc.salt,
            cipher,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Document, BackendError> {
        let doc = read_document(&self.path)?.ok_or_else(|| {
            BackendError::Failure(format!("{} was removed", self.path.display()))
        })?;
        if doc.salt != self.salt {
            return Err(BackendError::Failure(format!(
                "{} was replaced by another process; reopen the store",
                self.path.display()
            )));
        }
        Ok(doc)
    }

    /// Load, apply `change`, and write back under the exclusive lock.
    fn update<T>(
        &self,
        change: impl FnOnce(&mut BTreeMap<String, String>) -> Result<T, BackendError>,
    ) -> Result<T, BackendError> {
        let _lock = lock(&self.lock_path, true)?;
        let mut doc = self.load()?;
        let result = change(&mut doc.entries)?;
        write_document(&self.dir, &self.path, &doc)?;
        Ok(result)
    }
}

impl SecretBackend for FileBackend {
    fn kind(&self) -> &'static str {
        "file"
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, BackendError> {
        let _lock = lock(&self.lock_path, false)?;
        let doc = self.load()?;
        let sealed = doc.entries.get(key).ok_or(BackendError::NotFound)?;
        unseal(&self.cipher, key.as_bytes(), sealed)
            .map(|plain| plain.to_vec())
            .map_err(|_| BackendError::Failure(format!("entry {} failed to decrypt", key)))
    }

    fn set(&self, key: &str, data: &[u8]) -> Result<(), BackendError> {
        let sealed = seal(&self.cipher, key.as_bytes(), data)?;
        self.update(|entries| {
            entries.insert(key.to_string(), sealed);
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> Result<(), BackendError> {
        self.update(|entries| entries.remove(key).map(drop).ok_or(BackendError::NotFound))
    }

    fn keys(&self) -> Result<Vec<String>, BackendError> {
        let _lock = lock(&self.lock_path, false)?;
        Ok(self.load()?.entries.into_keys().collect())
    }
}

// ─── Locking & IO ────────────────────────────────────────────────────────────

/// The lock is released when the returned handle is dropped.
fn lock(path: &Path, exclusive: bool) -> Result<fs::File, BackendError> {
    let file = fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)
        .map_err(|e| BackendError::Unavailable(format!("failed to open {}: {}", path.display(), e)))?;
    let locked = if exclusive { file.lock() } else { file.lock_shared() };
    locked.map_err(|e| BackendError::Unavailable(format!("failed to lock {}: {}", path.display(), e)))?;
    Ok(file)
}

fn read_document(path: &Path) -> Result<Option<Document>, BackendError> {
    if !path.exists() {
        return Ok(None);
    }
    let data = fs::read(path).map_err(|e| {
        BackendError::Unavailable(format!("failed to read {}: {}", path.display(), e))
    })?;
    let doc: Document = serde_json::from_slice(&data).map_err(|e| {
        BackendError::Failure(format!("failed to parse {}: {}", path.display(), e))
    })?;
    if doc.version != FORMAT_VERSION {
        return Err(BackendError::Failure(format!(
            "{} has unsupported format version {}",
            path.display(),
            doc.version
        )));
    }
    Ok(Some(doc))
}

/// Replace `path` atomically. The temp file is created 0600 on unix.
fn write_document(dir: &Path, path: &Path, doc: &Document) -> Result<(), BackendError> {
    let mut data = serde_json::to_vec_pretty(doc)
        .map_err(|e| BackendError::Failure(format!("failed to encode entries: {}", e)))?;
    data.push(b'\n');

    let io_err = |what: &str, e: std::io::Error| {
        BackendError::Failure(format!("failed to {} temp file in {}: {}", what, dir.display(), e))
    };
    let mut temp = NamedTempFile::new_in(dir).map_err(|e| io_err("create", e))?;
    temp.write_all(&data).map_err(|e| io_err("write", e))?;
    temp.as_file().sync_all().map_err(|e| io_err("flush", e))?;
    temp.persist(path).map_err(|e| {
        BackendError::Failure(format!("failed to replace {}: {}", path.display(), e.error))
    })?;
    Ok(())
}

// ─── Crypto ──────────────────────────────────────────────────────────────────

fn derive_cipher(passphrase: &str, salt: &str, kdf: KdfParams) -> Result<Aes256Gcm, BackendError> {
    let salt = STANDARD
        .decode(salt)
        .map_err(|e| BackendError::Failure(format!("credential file salt is invalid: {}", e)))?;
    let params = Params::new(kdf.m_cost, kdf.t_cost, kdf.p_cost, Some(KEY_LEN))
        .map_err(|e| BackendError::Failure(format!("invalid Argon2 params: {}", e)))?;

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password_into(passphrase.as_bytes(), &salt, &mut key[..])
        .map_err(|e| BackendError::Failure(format!("Argon2id key derivation failed: {}", e)))?;

    Aes256Gcm::new_from_slice(&key[..])
        .map_err(|e| BackendError::Failure(format!("invalid derived key: {}", e)))
}

fn seal(cipher: &Aes256Gcm, aad: &[u8], plaintext: &[u8]) -> Result<String, BackendError> {
    let mut nonce = [0u8; NONCE_LEN];
    rand::rng().fill_bytes(&mut nonce);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), Payload { msg: plaintext, aad })
        .map_err(|_| BackendError::Failure("failed to encrypt entry".to_string()))?;

    let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    sealed.extend_from_slice(&nonce);
    sealed.extend_from_slice(&ciphertext);
    Ok(STANDARD.encode(sealed))
}

/// Any failure here (bad base64, short input, tag mismatch) means the entry
/// cannot be trusted, so callers only see that it failed.
fn unseal(cipher: &Aes256Gcm, aad: &[u8], sealed: &str) -> Result<Zeroizing<Vec<u8>>, ()> {
    let sealed = STANDARD.decode(sealed).map_err(drop)?;
    if sealed.len() < NONCE_LEN {
        return Err(());
    }
    let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
    cipher
        .decrypt(Nonce::from_slice(nonce), Payload { msg: ciphertext, aad })
        .map(Zeroizing::new)
        .map_err(drop)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
