use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::error::StorageError;
use super::key::ObjectKey;
use super::traits::{Blob, BlobStore};

/// Filesystem-backed blob store.
///
/// Each blob lives at `{base_path}/{key}`. The declared content type, when
/// present, is kept next to it under `{base_path}/.types/{key}`. Keys cannot
/// start with a dot, so the bookkeeping directories never collide with blobs.
pub struct FilesystemBlobStore {
    base_path: PathBuf,
    max_size: u64,
}

impl FilesystemBlobStore {
    /// Create a new filesystem blob store.
    pub async fn new(base_path: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        let store = Self {
            base_path,
            max_size,
        };
        store.create_dirs().await?;
        Ok(store)
    }

    async fn create_dirs(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.base_path).await?;
        fs::create_dir_all(self.base_path.join(".tmp")).await?;
        fs::create_dir_all(self.base_path.join(".types")).await?;
        Ok(())
    }

    fn blob_path(&self, key: &ObjectKey) -> PathBuf {
        self.base_path.join(key.as_str())
    }

    fn type_path(&self, key: &ObjectKey) -> PathBuf {
        self.base_path.join(".types").join(key.as_str())
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }

    /// Write `data` to a fresh temp file and return its path.
    async fn stage(&self, data: &[u8]) -> Result<PathBuf, StorageError> {
        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        Ok(temp_path)
    }

    /// Move a staged file to `dest`. Readers never observe a partial file.
    async fn commit(&self, staged: &Path, dest: &Path) -> Result<(), StorageError> {
        if let Err(e) = fs::rename(staged, dest).await {
            let _ = fs::remove_file(staged).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn write_content_type(
        &self,
        key: &ObjectKey,
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        let type_path = self.type_path(key);
        match content_type.filter(|ct| !ct.is_empty()) {
            Some(ct) => {
                let staged = self.stage(ct.as_bytes()).await?;
                self.commit(&staged, &type_path).await
            }
            None => match fs::remove_file(&type_path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            },
        }
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn ensure_ready(&self) -> Result<(), StorageError> {
        self.create_dirs().await
    }

    async fn put(
        &self,
        key: &ObjectKey,
        data: &[u8],
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        // The sidecar goes first: if it cannot be written, the blob under
        // `key` is left exactly as it was.
        let staged = self.stage(data).await?;
        if let Err(e) = self.write_content_type(key, content_type).await {
            let _ = fs::remove_file(&staged).await;
            return Err(e);
        }
        self.commit(&staged, &self.blob_path(key)).await
    }

    async fn get(&self, key: &ObjectKey) -> Result<Blob, StorageError> {
        let data = match fs::read(self.blob_path(key)).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(key.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let content_type = match fs::read_to_string(self.type_path(key)).await {
            Ok(ct) => Some(ct),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        Ok(Blob { data, content_type })
    }

    async fn delete(&self, key: &ObjectKey) -> Result<bool, StorageError> {
        let removed = match fs::remove_file(self.blob_path(key)).await {
            Ok(()) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => return Err(e.into()),
        };

        match fs::remove_file(self.type_path(key)).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        Ok(removed)
    }
}
