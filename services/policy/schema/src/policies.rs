use sea_orm::entity::prelude::*;

/// Published policy document. `content_sha256` is the fingerprint over
/// (title, body, attachment bytes); `version` increments whenever any of
/// those change.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "policies")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub body_markdown: Option<String>,
    pub file_key: Option<String>,
    pub content_sha256: String,
    pub version: i32,
    pub due_at: Option<chrono::DateTime<chrono::Utc>>,
    pub require_typed_signature: bool,
    pub created_by: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
