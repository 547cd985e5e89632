use sea_orm::entity::prelude::*;

/// Single-use code sent to a claimant's contact address.
/// One row per (session_id, claimant_id); re-issue overwrites it.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "verification_codes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub session_id: Uuid,
    pub claimant_id: Uuid,
    pub session_code_id: Option<Uuid>,
    pub contact: String,
    pub code: String,
    pub attempts: i16,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub verified: bool,
    pub verified_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
