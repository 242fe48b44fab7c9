use sea_orm::entity::prelude::*;

/// Immutable proof record, one per assignment (unique index on
/// `assignment_id` — the store-level race-breaker). Pins the policy version
/// and content fingerprint as they were at acknowledgment time.
/// Method wire values: "typed" | "oneclick".
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "acknowledgments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub assignment_id: Uuid,
    pub signer_name: String,
    pub signer_email: String,
    pub typed_signature: Option<String>,
    pub ip_address: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub user_agent: Option<String>,
    pub policy_version: i32,
    pub policy_hash_at_ack: String,
    pub ack_method: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
