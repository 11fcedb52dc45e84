//! Persistent "current asset" store.
//!
//! The engine works on one image at a time. Between CLI invocations that
//! image lives here as a single blob plus a small JSON record with its MIME
//! type and name.
//!
//! ## Keys
//!
//! The asset id is the SHA-256 of the file contents. Content-based rather
//! than name-based, so re-uploading the same photo under a new name keeps
//! the same identity, and a blob whose bytes no longer match its record is
//! detected on load.
//!
//! ## Storage
//!
//! ```text
//! <store>/current.bin    raw bytes as uploaded
//! <store>/current.json   StoredAsset record
//! ```
//!
//! A missing record is the "no asset present" state, not an error. A record
//! with another format version, unparseable JSON, or a hash mismatch is
//! treated the same way and logged.

use crate::metadata::MimeType;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use thiserror::Error;

const BLOB_FILENAME: &str = "current.bin";
const RECORD_FILENAME: &str = "current.json";

/// Bump to invalidate stored records when the format changes.
const RECORD_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// SHA-256 of `bytes`, lowercase hex.
pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Record written next to the blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAsset {
    pub version: u32,
    pub id: String,
    pub name: String,
    pub mime: MimeType,
    pub byte_size: u64,
}

/// A directory holding at most one asset.
#[derive(Debug, Clone)]
pub struct AssetStore {
    dir: PathBuf,
}

impl AssetStore {
    /// Open (and create if needed) the store directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Replace the current asset.
    pub fn save(&self, name: &str, mime: MimeType, bytes: &[u8]) -> Result<StoredAsset, StoreError> {
        let record = StoredAsset {
            version: RECORD_VERSION,
            id: hash_bytes(bytes),
            name: name.to_string(),
            mime,
            byte_size: bytes.len() as u64,
        };
        std::fs::write(self.dir.join(BLOB_FILENAME), bytes)?;
        let json = serde_json::to_string_pretty(&record)?;
        std::fs::write(self.dir.join(RECORD_FILENAME), json)?;
        log::debug!("stored {} as {}", record.name, record.id);
        Ok(record)
    }

    /// Load the current asset, or `None` when there is none.
    pub fn load(&self) -> Result<Option<(StoredAsset, Vec<u8>)>, StoreError> {
        let record_path = self.dir.join(RECORD_FILENAME);
        let content = match std::fs::read_to_string(&record_path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record: StoredAsset = match serde_json::from_str(&content) {
            Ok(r) => r,
            Err(e) => {
                log::warn!("ignoring unreadable asset record {}: {e}", record_path.display());
                return Ok(None);
            }
        };
        if record.version != RECORD_VERSION {
            log::warn!(
                "ignoring asset record version {} (expected {RECORD_VERSION})",
                record.version
            );
            return Ok(None);
        }

        let bytes = match std::fs::read(self.dir.join(BLOB_FILENAME)) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("asset record {} has no blob", record.id);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        if hash_bytes(&bytes) != record.id {
            log::warn!("stored blob does not match asset {}", record.id);
            return Ok(None);
        }
        Ok(Some((record, bytes)))
    }

    /// Remove the current asset. Returns whether anything was removed.
    pub fn delete(&self) -> Result<bool, StoreError> {
        let mut removed = false;
        for name in [RECORD_FILENAME, BLOB_FILENAME] {
            match std::fs::remove_file(self.dir.join(name)) {
                Ok(()) => removed = true,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(removed)
    }
}
