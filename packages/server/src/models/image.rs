use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::image;

/// A stored image: the metadata row plus the key of its blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ImageRecord {
    /// Identifier assigned by the metadata store. Never reused.
    #[schema(example = 1)]
    pub id: i32,
    /// Original upload filename.
    #[schema(example = "a.png")]
    pub filename: String,
    /// Payload size in bytes.
    #[schema(example = 3)]
    pub size: i64,
    /// Key of the blob in the object store.
    #[schema(example = "0192f1c4-8a7e-7d3b-9c11-6f0e2a4b5c6d-a.png")]
    pub object_key: String,
    /// Declared MIME type; empty when the client sent none.
    #[schema(example = "image/png")]
    pub content_type: String,
    pub created_at: DateTime<Utc>,
}

impl From<image::Model> for ImageRecord {
    fn from(model: image::Model) -> Self {
        Self {
            id: model.id,
            filename: model.filename,
            size: model.size,
            object_key: model.object_key,
            content_type: model.content_type.unwrap_or_default(),
            created_at: model.created_at.and_utc(),
        }
    }
}
