//! Expense entity - A single recorded expense.
//!
//! Each expense has an amount, optional description, the calendar `date` it
//! was incurred, a free-text `payment_method`, a `category_id`, the owning
//! `user_id` and a `created_at` timestamp used for "newest first" ordering.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Expense database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expenses")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// UUID string identifier
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Amount spent, always positive
    pub amount: f64,
    /// Optional note (e.g., "Flight to conference")
    pub description: Option<String>,
    /// When the expense was incurred
    pub date: DateTimeUtc,
    /// How it was paid (e.g., "Credit Card")
    pub payment_method: String,
    /// Category this expense is filed under
    pub category_id: String,
    /// Owner of the expense
    pub user_id: String,
    /// When the record was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Expense and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each expense belongs to one category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
    /// Each expense belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
