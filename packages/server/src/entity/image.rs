use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "images")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Original upload filename.
    #[sea_orm(column_type = "Text")]
    pub filename: String,

    pub size: i64,

    /// Key of the blob in the object store bucket.
    #[sea_orm(column_type = "Text")]
    pub object_key: String,

    /// Declared MIME type; `NULL` when the client sent none.
    #[sea_orm(column_type = "Text", nullable)]
    pub content_type: Option<String>,

    /// Plain `timestamp` column; always holds UTC.
    pub created_at: DateTime,
}

impl ActiveModelBehavior for ActiveModel {}
