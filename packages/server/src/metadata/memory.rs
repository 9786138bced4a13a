use std::sync::RwLock;

use async_trait::async_trait;

use super::{MetadataError, MetadataStore, NewImage};
use crate::models::image::ImageRecord;

#[derive(Default)]
struct Table {
    /// Kept sorted by id: ids only grow and rows are appended.
    rows: Vec<ImageRecord>,
    last_id: i32,
}

/// Process-wide in-memory metadata table.
///
/// Readers share the lock; an insert or delete holds it exclusively for one
/// append or removal. Ids keep counting up across deletes.
#[derive(Default)]
pub struct MemoryMetadataStore {
    table: RwLock<Table>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> MetadataError {
        MetadataError::Internal("metadata table lock poisoned".into())
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn insert(&self, image: NewImage) -> Result<ImageRecord, MetadataError> {
        let mut table = self.table.write().map_err(|_| Self::poisoned())?;
        table.last_id = table
            .last_id
            .checked_add(1)
            .ok_or_else(|| MetadataError::Internal("image id space exhausted".into()))?;

        let record = ImageRecord {
            id: table.last_id,
            filename: image.filename,
            size: image.size,
            object_key: image.object_key,
            content_type: image.content_type,
            created_at: image.created_at,
        };
        table.rows.push(record.clone());
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<ImageRecord>, MetadataError> {
        let table = self.table.read().map_err(|_| Self::poisoned())?;
        Ok(table.rows.clone())
    }

    async fn find(&self, id: i32) -> Result<Option<ImageRecord>, MetadataError> {
        let table = self.table.read().map_err(|_| Self::poisoned())?;
        Ok(table
            .rows
            .binary_search_by_key(&id, |r| r.id)
            .ok()
            .map(|idx| table.rows[idx].clone()))
    }

    async fn delete(&self, id: i32) -> Result<bool, MetadataError> {
        let mut table = self.table.write().map_err(|_| Self::poisoned())?;
        match table.rows.binary_search_by_key(&id, |r| r.id) {
            Ok(idx) => {
                table.rows.remove(idx);
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }
}
