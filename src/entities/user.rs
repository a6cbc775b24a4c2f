//! User entity - Represents an account that owns expenses.
//!
//! Users are created by sign-up or by the seed command and are never mutated
//! afterwards. The password is stored only as an Argon2 PHC string.

use sea_orm::entity::prelude::*;
use serde::Serialize;

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "users")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// UUID string identifier
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Display name shown in the navigation bar
    pub name: String,
    /// Login email, unique across users
    #[sea_orm(unique)]
    pub email: String,
    /// Argon2id hash in PHC format
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// When the account was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user owns many expenses
    #[sea_orm(has_many = "super::expense::Entity")]
    Expenses,
    /// One user may hold several sessions
    #[sea_orm(has_many = "super::session::Entity")]
    Sessions,
}

impl Related<super::expense::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
