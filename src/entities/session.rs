//! Session entity - Server-side record behind a `session` cookie.

use sea_orm::entity::prelude::*;

/// Session database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    /// Random opaque token handed to the client
    #[sea_orm(primary_key, auto_increment = false)]
    pub token: String,
    /// User this session authenticates
    pub user_id: String,
    /// When the session was issued
    pub created_at: DateTimeUtc,
    /// Sessions at or past this instant are rejected
    pub expires_at: DateTimeUtc,
}

/// Defines relationships between Session and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each session belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
