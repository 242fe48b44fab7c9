use sea_orm::entity::prelude::*;

/// Pending login challenge: 6-digit code plus a magic-link identifier,
/// both bound to one email. Expires after 10 minutes; at most one live row
/// per email (issuing a new one deletes the old).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "auth_codes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub email: String,
    pub code: String,
    pub magic_id: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub used: bool,
    pub attempts: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
