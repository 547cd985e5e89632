use sea_orm::entity::prelude::*;

/// Terminal attendance artifact. Primary key (session_id, claimant_id) makes
/// duplicate submissions collide instead of inserting twice.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "attendance_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub session_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub claimant_id: Uuid,
    /// `present` | `absent` | `late`
    pub status: String,
    pub marked_at: chrono::DateTime<chrono::Utc>,
    pub session_code_id: Option<Uuid>,
    pub verification_code_id: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::class_sessions::Entity",
        from = "Column::SessionId",
        to = "super::class_sessions::Column::Id"
    )]
    ClassSession,
    #[sea_orm(
        belongs_to = "super::profiles::Entity",
        from = "Column::ClaimantId",
        to = "super::profiles::Column::Id"
    )]
    Profile,
}

impl Related<super::class_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassSession.def()
    }
}

impl Related<super::profiles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
