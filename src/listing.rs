//! On-disk cache of directory listings keyed by request path.
//!
//! Entries are write-once: a cached listing is served verbatim for the
//! lifetime of the cache directory, even if the directory it describes
//! changes afterwards.

use crate::error::Result;
use crate::locks::{KeyGuard, KeyedLocks};
use crate::persist;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// One child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    /// Whether the child is a directory.
    #[serde(rename = "isDir")]
    pub is_dir: bool,
    /// File name of the child.
    pub name: String,
    /// Size in bytes as reported by metadata.
    pub size: u64,
}

/// Serialized listing document: `{"entries": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// Children in filesystem enumeration order.
    pub entries: Vec<DirEntry>,
}

impl Listing {
    /// Serialize to the bytes that are cached and served.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Read a directory once, in enumeration order (unsorted).
///
/// Children whose metadata cannot be read are skipped, as are in-flight
/// temporary files of derivatives being written.
pub async fn list_directory(path: &Path) -> Result<Listing> {
    let mut dir = tokio::fs::read_dir(path).await?;
    let mut entries = Vec::new();

    while let Some(entry) = dir.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if persist::is_temp_name(&name) {
            continue;
        }

        let meta = match entry.metadata().await {
            Ok(meta) => meta,
            Err(e) => {
                tracing::debug!(path = %entry.path().display(), error = %e, "Skipping unreadable entry");
                continue;
            }
        };

        entries.push(DirEntry {
            is_dir: meta.is_dir(),
            name,
            size: meta.len(),
        });
    }

    Ok(Listing { entries })
}

/// Content-addressed listing cache rooted at one directory.
#[derive(Clone)]
pub struct ListingCache {
    dir: PathBuf,
    locks: KeyedLocks,
}

impl ListingCache {
    /// Create a cache stored under `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            locks: KeyedLocks::new(),
        }
    }

    /// Cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the cache directory if it does not exist.
    pub fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Hex SHA-256 of the raw request path.
    pub fn key(request_path: &str) -> String {
        format!("{:x}", Sha256::digest(request_path.as_bytes()))
    }

    /// File holding the entry for `key`.
    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Stored bytes for `key`, if an entry exists.
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.entry_path(key)).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Serialize and store `listing` under `key`, returning the stored bytes.
    pub async fn put(&self, key: &str, listing: &Listing) -> Result<Vec<u8>> {
        let data = listing.to_bytes()?;
        persist::write_atomic_async(&self.entry_path(key), &data).await?;
        Ok(data)
    }

    /// Serialize writers of `key`.
    pub async fn lock(&self, key: &str) -> KeyGuard {
        self.locks.lock(key).await
    }
}
