use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, NotSet, QueryOrder, Set};

use super::{MetadataError, MetadataStore, NewImage};
use crate::entity::image;
use crate::models::image::ImageRecord;

/// Metadata store backed by the `images` table.
#[derive(Clone)]
pub struct SqlMetadataStore {
    db: DatabaseConnection,
}

impl SqlMetadataStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MetadataStore for SqlMetadataStore {
    async fn insert(&self, image: NewImage) -> Result<ImageRecord, MetadataError> {
        let content_type = Some(image.content_type).filter(|ct| !ct.is_empty());
        let model = image::ActiveModel {
            id: NotSet,
            filename: Set(image.filename),
            size: Set(image.size),
            object_key: Set(image.object_key),
            content_type: Set(content_type),
            created_at: Set(image.created_at.naive_utc()),
        }
        .insert(&self.db)
        .await?;

        Ok(ImageRecord::from(model))
    }

    async fn list(&self) -> Result<Vec<ImageRecord>, MetadataError> {
        let rows = image::Entity::find()
            .order_by_asc(image::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(ImageRecord::from).collect())
    }

    async fn find(&self, id: i32) -> Result<Option<ImageRecord>, MetadataError> {
        Ok(image::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(ImageRecord::from))
    }

    async fn delete(&self, id: i32) -> Result<bool, MetadataError> {
        let result = image::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}
