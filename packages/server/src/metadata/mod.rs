//! Persistence of [`ImageRecord`] rows.
//!
//! The coordinator only needs CRUD-shaped calls, so the store is a trait with
//! a database-backed implementation for deployments and an in-memory one for
//! tests and single-node demos.

mod memory;
mod sql;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::DbErr;
use thiserror::Error;

use crate::models::image::ImageRecord;

pub use memory::MemoryMetadataStore;
pub use sql::SqlMetadataStore;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("{0}")]
    Internal(String),
}

/// A row to insert. The store assigns the id.
#[derive(Debug, Clone)]
pub struct NewImage {
    pub filename: String,
    pub size: i64,
    pub object_key: String,
    /// Empty when the client declared no content type.
    pub content_type: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Insert a row and return it with its assigned id.
    async fn insert(&self, image: NewImage) -> Result<ImageRecord, MetadataError>;

    /// All rows in ascending id order.
    async fn list(&self) -> Result<Vec<ImageRecord>, MetadataError>;

    async fn find(&self, id: i32) -> Result<Option<ImageRecord>, MetadataError>;

    /// Remove a row. Returns `false` if no row had this id.
    async fn delete(&self, id: i32) -> Result<bool, MetadataError>;
}
