use async_trait::async_trait;
use ::s3::creds::Credentials;
use ::s3::{Bucket, BucketConfiguration, Region};
use tracing::{debug, info};

use super::error::StorageError;
use super::key::ObjectKey;
use super::traits::{Blob, BlobStore, DEFAULT_CONTENT_TYPE};

/// Connection settings for an S3-compatible object store.
#[derive(Debug, Clone)]
pub struct S3Settings {
    /// Endpoint URL, e.g. `http://minio:9000`. A bare `host:port` is
    /// treated as plain HTTP.
    pub endpoint: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
}

/// Blob store backed by one bucket of an S3-compatible service.
///
/// Requests use path-style addressing (`http://host/bucket/key`), which
/// MinIO requires.
pub struct S3BlobStore {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
}

impl S3BlobStore {
    pub fn new(settings: &S3Settings) -> Result<Self, StorageError> {
        let endpoint = if settings.endpoint.contains("://") {
            settings.endpoint.clone()
        } else {
            format!("http://{}", settings.endpoint)
        };
        let region = Region::Custom {
            region: settings.region.clone(),
            endpoint,
        };
        let credentials = Credentials::new(
            Some(settings.access_key.as_str()),
            Some(settings.secret_key.as_str()),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Backend(format!("invalid credentials: {e}")))?;

        let bucket =
            Bucket::new(&settings.bucket, region.clone(), credentials.clone())?.with_path_style();

        Ok(Self {
            bucket,
            region,
            credentials,
        })
    }

    /// Reject non-2xx responses that rust-s3 hands back as `Ok`.
    fn check_status(key: &ObjectKey, status: u16, op: &str) -> Result<(), StorageError> {
        match status {
            200..=299 => Ok(()),
            404 => Err(StorageError::NotFound(key.to_string())),
            other => Err(StorageError::Backend(format!(
                "{op} {key} returned HTTP {other}"
            ))),
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn ensure_ready(&self) -> Result<(), StorageError> {
        if self.bucket.exists().await? {
            debug!(bucket = %self.bucket.name(), "Bucket exists");
            return Ok(());
        }

        Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await?;
        info!(bucket = %self.bucket.name(), "Created bucket");
        Ok(())
    }

    async fn put(
        &self,
        key: &ObjectKey,
        data: &[u8],
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        let content_type = content_type
            .filter(|ct| !ct.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE);
        let response = self
            .bucket
            .put_object_with_content_type(key.as_str(), data, content_type)
            .await?;
        Self::check_status(key, response.status_code(), "PUT")
    }

    async fn get(&self, key: &ObjectKey) -> Result<Blob, StorageError> {
        let response = self.bucket.get_object(key.as_str()).await.map_err(|e| {
            if let ::s3::error::S3Error::HttpFailWithBody(404, _) = e {
                StorageError::NotFound(key.to_string())
            } else {
                e.into()
            }
        })?;
        Self::check_status(key, response.status_code(), "GET")?;

        let content_type = response
            .headers()
            .get("content-type")
            .filter(|ct| !ct.is_empty())
            .cloned();

        Ok(Blob {
            data: response.bytes().to_vec(),
            content_type,
        })
    }

    /// S3 answers 204 whether or not the key existed, so a successful delete
    /// always reports `true`.
    async fn delete(&self, key: &ObjectKey) -> Result<bool, StorageError> {
        let response = self.bucket.delete_object(key.as_str()).await?;
        match response.status_code() {
            404 => Ok(false),
            status => Self::check_status(key, status, "DELETE").map(|()| true),
        }
    }
}
