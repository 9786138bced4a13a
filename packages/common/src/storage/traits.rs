use async_trait::async_trait;

use super::error::StorageError;
use super::key::ObjectKey;

/// Content type reported for blobs stored without one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A blob read back from a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub data: Vec<u8>,
    /// Content type recorded when the blob was written, if any.
    pub content_type: Option<String>,
}

/// Key-addressed blob storage.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Prepare the backing store (create the bucket or root directory).
    async fn ensure_ready(&self) -> Result<(), StorageError> {
        Ok(())
    }

    /// Store `data` under `key`, replacing any existing blob.
    async fn put(
        &self,
        key: &ObjectKey,
        data: &[u8],
        content_type: Option<&str>,
    ) -> Result<(), StorageError>;

    /// Retrieve the blob stored under `key`.
    async fn get(&self, key: &ObjectKey) -> Result<Blob, StorageError>;

    /// Delete the blob stored under `key`.
    ///
    /// Returns `true` if the blob was deleted, `false` if it did not exist.
    /// Deleting a missing key is never an error.
    async fn delete(&self, key: &ObjectKey) -> Result<bool, StorageError>;
}
