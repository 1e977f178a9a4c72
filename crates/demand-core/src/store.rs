//! Key/value persistence for the archive and every derived artifact.
//!
//! Keys are slash-separated relative paths such as `predicted.json` or
//! `frontend/predicted.json`. Entry points receive a store instead of
//! reaching for fixed file locations, so tests can run against
//! [`MemoryStore`] or a [`FsStore`] rooted in a temp directory.

use crate::error::Result;
use crate::io;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub trait ArtifactStore {
    /// Returns `None` when nothing is stored under `key`.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replaces whatever is stored under `key`.
    fn write(&mut self, key: &str, data: &[u8]) -> Result<()>;
}

// ---------------------------------------------------------------------------
// FsStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl ArtifactStore for FsStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        io::read_if_exists(&self.path_for(key))
    }

    fn write(&mut self, key: &str, data: &[u8]) -> Result<()> {
        io::atomic_write(&self.path_for(key), data)
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ArtifactStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, data: &[u8]) -> Result<()> {
        self.entries.insert(key.to_string(), data.to_vec());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JSON helpers
// ---------------------------------------------------------------------------

pub fn read_json<T: DeserializeOwned>(store: &impl ArtifactStore, key: &str) -> Result<Option<T>> {
    match store.read(key)? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

/// Pretty-printed with two-space indentation, the layout the dashboard reads.
pub fn write_json<T: Serialize + ?Sized>(
    store: &mut impl ArtifactStore,
    key: &str,
    value: &T,
) -> Result<()> {
    let data = serde_json::to_vec_pretty(value)?;
    store.write(key, &data)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
