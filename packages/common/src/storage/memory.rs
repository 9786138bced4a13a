use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::error::StorageError;
use super::key::ObjectKey;
use super::traits::{Blob, BlobStore};

/// In-process blob store for tests and single-node demos.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Blob>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blobs currently stored.
    pub fn len(&self) -> usize {
        self.blobs.read().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned() -> StorageError {
        StorageError::Backend("memory blob store lock poisoned".into())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(
        &self,
        key: &ObjectKey,
        data: &[u8],
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        let blob = Blob {
            data: data.to_vec(),
            content_type: content_type
                .filter(|ct| !ct.is_empty())
                .map(str::to_string),
        };
        self.blobs
            .write()
            .map_err(|_| Self::poisoned())?
            .insert(key.to_string(), blob);
        Ok(())
    }

    async fn get(&self, key: &ObjectKey) -> Result<Blob, StorageError> {
        self.blobs
            .read()
            .map_err(|_| Self::poisoned())?
            .get(key.as_str())
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &ObjectKey) -> Result<bool, StorageError> {
        Ok(self
            .blobs
            .write()
            .map_err(|_| Self::poisoned())?
            .remove(key.as_str())
            .is_some())
    }
}
