use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use common::storage::filesystem::FilesystemBlobStore;
use common::storage::memory::MemoryBlobStore;
use common::storage::s3::{S3BlobStore, S3Settings};
use common::storage::BlobStore;
use tracing::{info, warn};

use crate::config::{AppConfig, BlobBackend, MetadataBackend, StorageConfig};
use crate::coordinator::ImageCoordinator;
use crate::database::connect_with_retry;
use crate::metadata::{MemoryMetadataStore, MetadataStore, SqlMetadataStore};

#[derive(Clone)]
pub struct AppState {
    pub images: Arc<ImageCoordinator>,
    pub config: AppConfig,
}

impl AppState {
    /// Connect both stores named by `config` and wire them together.
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let metadata: Arc<dyn MetadataStore> = match config.database.backend {
            MetadataBackend::Postgres => {
                let db = connect_with_retry(&config.database)
                    .await
                    .context("Failed to connect to the metadata database")?;
                Arc::new(SqlMetadataStore::new(db))
            }
            MetadataBackend::Memory => {
                warn!("Using the in-memory metadata store; records are lost on restart");
                Arc::new(MemoryMetadataStore::new())
            }
        };

        let blobs = build_blob_store(&config.storage).await?;
        // Bucket creation is best effort: the bucket may exist already, or
        // the credentials may only allow object access.
        if let Err(e) = blobs.ensure_ready().await {
            warn!(error = %e, "Blob store is not ready; continuing");
        }

        let images = ImageCoordinator::new(
            blobs,
            metadata,
            config.storage.key_policy,
            Duration::from_secs(config.storage.operation_timeout_secs),
        );

        Ok(Self {
            images: Arc::new(images),
            config,
        })
    }
}

async fn build_blob_store(config: &StorageConfig) -> anyhow::Result<Arc<dyn BlobStore>> {
    let store: Arc<dyn BlobStore> = match config.backend {
        BlobBackend::S3 => {
            info!(endpoint = %config.endpoint, bucket = %config.bucket, "Using S3 blob store");
            let settings = S3Settings {
                endpoint: config.endpoint.clone(),
                region: config.region.clone(),
                access_key: config.access_key.clone(),
                secret_key: config.secret_key.clone(),
                bucket: config.bucket.clone(),
            };
            Arc::new(S3BlobStore::new(&settings).context("Invalid S3 settings")?)
        }
        BlobBackend::Filesystem => {
            info!(path = %config.path, "Using filesystem blob store");
            let store = FilesystemBlobStore::new(PathBuf::from(&config.path), config.max_upload_size)
                .await
                .context("Failed to prepare the blob directory")?;
            Arc::new(store)
        }
        BlobBackend::Memory => {
            warn!("Using the in-memory blob store; images are lost on restart");
            Arc::new(MemoryBlobStore::new())
        }
    };
    Ok(store)
}
