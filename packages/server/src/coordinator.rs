//! Coordinates the blob store and the metadata store.
//!
//! The two stores share no transaction. Writes go blob first and row second,
//! deletes go blob first and row last, and every step must succeed before the
//! next one starts. The fault windows this leaves open are:
//!
//! * create: the blob was written but the row insert failed. The blob is
//!   removed on a best-effort basis and the caller sees
//!   [`CatalogError::MetadataWriteFailed`].
//! * delete: the blob was removed but the row delete failed. The row now
//!   points at nothing, downloads report [`CatalogError::StorageReadFailed`],
//!   and retrying the delete converges because deleting a missing blob
//!   succeeds.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use common::storage::{BlobStore, DEFAULT_CONTENT_TYPE, KeyPolicy, ObjectKey};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::metadata::{MetadataStore, NewImage};
use crate::models::image::ImageRecord;
use crate::utils::filename::validate_flat_filename;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Image {0} not found")]
    NotFound(i32),

    #[error("Storage write failed: {0}")]
    StorageWriteFailed(String),

    #[error("Storage read failed: {0}")]
    StorageReadFailed(String),

    /// A blob operation already took effect but the matching metadata write
    /// did not.
    #[error("Metadata write failed: {0}")]
    MetadataWriteFailed(String),
}

/// Bytes and framing information for a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub data: Vec<u8>,
    pub content_type: String,
    pub object_key: String,
}

pub struct ImageCoordinator {
    blobs: Arc<dyn BlobStore>,
    metadata: Arc<dyn MetadataStore>,
    key_policy: KeyPolicy,
    op_timeout: Duration,
}

impl ImageCoordinator {
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        metadata: Arc<dyn MetadataStore>,
        key_policy: KeyPolicy,
        op_timeout: Duration,
    ) -> Self {
        Self {
            blobs,
            metadata,
            key_policy,
            op_timeout,
        }
    }

    /// Store `payload` and record it.
    #[instrument(skip(self, payload), fields(size = payload.len()))]
    pub async fn create(
        &self,
        payload: &[u8],
        filename: &str,
        content_type: &str,
    ) -> Result<ImageRecord, CatalogError> {
        if payload.is_empty() {
            return Err(CatalogError::InvalidInput("Uploaded file is empty".into()));
        }
        let filename = validate_flat_filename(filename)
            .map_err(|e| CatalogError::InvalidInput(e.message().into()))?;
        let key = self
            .key_policy
            .derive(filename)
            .map_err(|e| CatalogError::InvalidInput(e.to_string()))?;
        let content_type = content_type.trim();

        self.bounded(
            "blob put",
            self.blobs.put(
                &key,
                payload,
                Some(content_type).filter(|ct| !ct.is_empty()),
            ),
        )
        .await
        .map_err(|e| {
            warn!(object_key = %key, error = %e, "Blob write failed");
            CatalogError::StorageWriteFailed(e)
        })?;

        let new_image = NewImage {
            filename: filename.to_string(),
            size: i64::try_from(payload.len()).unwrap_or(i64::MAX),
            object_key: key.to_string(),
            content_type: content_type.to_string(),
            created_at: Utc::now(),
        };

        match self
            .bounded("metadata insert", self.metadata.insert(new_image))
            .await
        {
            Ok(record) => {
                info!(id = record.id, object_key = %record.object_key, "Image stored");
                Ok(record)
            }
            Err(e) => {
                error!(
                    object_key = %key,
                    error = %e,
                    "Metadata insert failed after blob write, removing orphaned blob"
                );
                self.discard_orphan(&key).await;
                Err(CatalogError::MetadataWriteFailed(e))
            }
        }
    }

    /// Every record in ascending id order.
    pub async fn list(&self) -> Result<Vec<ImageRecord>, CatalogError> {
        self.bounded("metadata list", self.metadata.list())
            .await
            .map_err(CatalogError::StorageReadFailed)
    }

    #[instrument(skip(self))]
    pub async fn download(&self, id: i32) -> Result<Download, CatalogError> {
        let record = self.lookup(id).await?;
        let key = ObjectKey::new(record.object_key.as_str())
            .map_err(|e| CatalogError::StorageReadFailed(e.to_string()))?;

        let blob = self
            .bounded("blob get", self.blobs.get(&key))
            .await
            .map_err(|e| {
                error!(id, object_key = %key, error = %e, "Blob unreadable for existing record");
                CatalogError::StorageReadFailed(e)
            })?;

        let content_type = if !record.content_type.is_empty() {
            record.content_type
        } else {
            blob.content_type
                .filter(|ct| !ct.is_empty())
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string())
        };

        Ok(Download {
            data: blob.data,
            content_type,
            object_key: record.object_key,
        })
    }

    /// Remove the blob, then the row.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), CatalogError> {
        let record = self.lookup(id).await?;
        let key = ObjectKey::new(record.object_key.as_str())
            .map_err(|e| CatalogError::StorageWriteFailed(e.to_string()))?;

        self.bounded("blob delete", self.blobs.delete(&key))
            .await
            .map_err(|e| {
                warn!(id, object_key = %key, error = %e, "Blob delete failed, record kept");
                CatalogError::StorageWriteFailed(e)
            })?;

        match self
            .bounded("metadata delete", self.metadata.delete(id))
            .await
        {
            Ok(true) => {
                info!(id, object_key = %key, "Image deleted");
                Ok(())
            }
            // Removed by a concurrent delete after our lookup.
            Ok(false) => Err(CatalogError::NotFound(id)),
            Err(e) => {
                error!(
                    id,
                    object_key = %key,
                    error = %e,
                    "Blob deleted but metadata row remains"
                );
                Err(CatalogError::MetadataWriteFailed(e))
            }
        }
    }

    async fn lookup(&self, id: i32) -> Result<ImageRecord, CatalogError> {
        self.bounded("metadata find", self.metadata.find(id))
            .await
            .map_err(CatalogError::StorageReadFailed)?
            .ok_or(CatalogError::NotFound(id))
    }

    /// Best-effort removal of a blob whose row was never written. Failure is
    /// logged and never replaces the caller's error.
    async fn discard_orphan(&self, key: &ObjectKey) {
        match self.bounded("blob delete", self.blobs.delete(key)).await {
            Ok(_) => warn!(object_key = %key, "Removed orphaned blob"),
            Err(e) => error!(
                object_key = %key,
                error = %e,
                "Failed to remove orphaned blob"
            ),
        }
    }

    /// Run one store call under the operation timeout.
    async fn bounded<T, E, F>(&self, op: &str, call: F) -> Result<T, String>
    where
        E: Display,
        F: Future<Output = Result<T, E>>,
    {
        match tokio::time::timeout(self.op_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!("{op} timed out after {:?}", self.op_timeout)),
        }
    }
}
