//! Blob storage contract, used for feedback images.

use super::write_atomic;
use crate::error::StoreError;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Put/get of opaque blobs under string keys. Existing keys are never
/// overwritten by the feedback flow; every image gets a fresh uuid key.
pub trait ObjectStore: Send + Sync {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;
    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError>;
}

/// Filesystem-backed object store; keys are relative paths under a root.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsObjectStore { root: root.into() }
    }

    fn resolve(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl ObjectStore for FsObjectStore {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        write_atomic(&self.resolve(key), bytes)?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        match std::fs::read(self.resolve(key)) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(StoreError::MissingObject { key: key.to_string() })
            }
            Err(err) => Err(err.into()),
        }
    }
}
