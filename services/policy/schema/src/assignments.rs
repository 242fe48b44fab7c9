use sea_orm::entity::prelude::*;

/// One "this policy must be acknowledged by this user" record.
/// Status wire values: "pending" | "viewed" | "acknowledged" | "declined".
/// `magic_link_token` caches the signed link so repeated sends reuse it.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "assignments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub policy_id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub viewed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub acknowledged_at: Option<chrono::DateTime<chrono::Utc>>,
    pub reminder_count: i32,
    pub magic_link_token: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
