//! Category business logic - Handles all category-related operations.
//!
//! Categories are shared between users, so none of these functions take an
//! owner. Every read returns a [`CategorySummary`] carrying the number of
//! expenses filed under the category. Deletion follows the configured
//! [`DeletePolicy`].

use crate::{
    config::settings::DeletePolicy,
    entities::{Category, Expense, category, expense},
    errors::{Error, Result},
};
use sea_orm::{
    QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*, sea_query::Expr,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

const RESOURCE: &str = "category";

/// Category create/update payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CategoryForm {
    /// Unique display name
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
}

/// Number of expenses referencing a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExpenseCount {
    /// Expenses of every user filed under the category
    pub expenses: u64,
}

/// A category together with its expense count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    /// The category row
    #[serde(flatten)]
    pub category: category::Model,
    /// Serialized as `_count: { expenses }`
    #[serde(rename = "_count")]
    pub count: ExpenseCount,
}

/// Lists every category alphabetically with its expense count.
pub async fn list_categories(db: &DatabaseConnection) -> Result<Vec<CategorySummary>> {
    let categories = Category::find()
        .order_by_asc(category::Column::Name)
        .all(db)
        .await?;
    let counts = count_expenses_by_category(db).await?;

    Ok(categories
        .into_iter()
        .map(|category| {
            let expenses = counts.get(&category.id).copied().unwrap_or(0);
            CategorySummary {
                category,
                count: ExpenseCount { expenses },
            }
        })
        .collect())
}

/// Finds a category by id.
pub async fn get_category_by_id(
    db: &DatabaseConnection,
    category_id: &str,
) -> Result<Option<category::Model>> {
    Category::find_by_id(category_id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a category by its exact name.
pub async fn get_category_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<category::Model>> {
    Category::find()
        .filter(category::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Fetches one category with its expense count, or [`Error::NotFound`].
pub async fn get_category(db: &DatabaseConnection, category_id: &str) -> Result<CategorySummary> {
    let category = get_category_by_id(db, category_id)
        .await?
        .ok_or_else(|| not_found(category_id))?;
    summarize(db, category).await
}

/// Creates a category. A duplicate name surfaces as [`Error::Conflict`].
pub async fn create_category(db: &DatabaseConnection, form: CategoryForm) -> Result<CategorySummary> {
    let (name, description) = clean_form(form)?;

    let category = category::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        name: Set(name),
        description: Set(description),
        created_at: Set(chrono::Utc::now()),
    };

    let created = category.insert(db).await.map_err(|e| name_conflict(e.into()))?;
    tracing::info!("Created category '{}'", created.name);

    Ok(CategorySummary {
        category: created,
        count: ExpenseCount { expenses: 0 },
    })
}

/// Renames or re-describes a category.
pub async fn update_category(
    db: &DatabaseConnection,
    category_id: &str,
    form: CategoryForm,
) -> Result<CategorySummary> {
    let (name, description) = clean_form(form)?;

    let existing = get_category_by_id(db, category_id)
        .await?
        .ok_or_else(|| not_found(category_id))?;

    let mut active: category::ActiveModel = existing.into();
    active.name = Set(name);
    active.description = Set(description);
    let updated = active.update(db).await.map_err(|e| name_conflict(e.into()))?;

    summarize(db, updated).await
}

/// Deletes a category according to `policy`.
///
/// With [`DeletePolicy::Restrict`] a category that still has expenses is left
/// untouched and [`Error::Conflict`] is returned. With [`DeletePolicy::Cascade`]
/// its expenses are removed in the same database transaction.
pub async fn delete_category(
    db: &DatabaseConnection,
    category_id: &str,
    policy: DeletePolicy,
) -> Result<()> {
    let txn = db.begin().await?;

    Category::find_by_id(category_id.to_string())
        .one(&txn)
        .await?
        .ok_or_else(|| not_found(category_id))?;

    let referencing = Expense::find()
        .filter(expense::Column::CategoryId.eq(category_id))
        .count(&txn)
        .await?;

    if referencing > 0 {
        match policy {
            DeletePolicy::Restrict => {
                return Err(Error::Conflict {
                    message: format!(
                        "Category is used by {referencing} expense{}",
                        if referencing == 1 { "" } else { "s" }
                    ),
                });
            }
            DeletePolicy::Cascade => {
                let removed = Expense::delete_many()
                    .filter(expense::Column::CategoryId.eq(category_id))
                    .exec(&txn)
                    .await?;
                tracing::info!(
                    "Cascade removed {} expenses of category {category_id}",
                    removed.rows_affected
                );
            }
        }
    }

    Category::delete_by_id(category_id.to_string())
        .exec(&txn)
        .await?;
    txn.commit().await?;

    Ok(())
}

/// Expense counts keyed by category id. Categories without expenses are absent.
pub async fn count_expenses_by_category(db: &DatabaseConnection) -> Result<HashMap<String, u64>> {
    let rows: Vec<(String, i64)> = Expense::find()
        .select_only()
        .column(expense::Column::CategoryId)
        .column_as(Expr::col(expense::Column::Id).count(), "count")
        .group_by(expense::Column::CategoryId)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(category_id, count)| (category_id, u64::try_from(count).unwrap_or(0)))
        .collect())
}

/// Maps each of `category_ids` that still exists to its name.
pub async fn category_names(
    db: &DatabaseConnection,
    category_ids: Vec<String>,
) -> Result<HashMap<String, String>> {
    if category_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let categories = Category::find()
        .filter(category::Column::Id.is_in(category_ids))
        .all(db)
        .await?;

    Ok(categories
        .into_iter()
        .map(|category| (category.id, category.name))
        .collect())
}

async fn summarize(db: &DatabaseConnection, category: category::Model) -> Result<CategorySummary> {
    let expenses = Expense::find()
        .filter(expense::Column::CategoryId.eq(category.id.as_str()))
        .count(db)
        .await?;

    Ok(CategorySummary {
        category,
        count: ExpenseCount { expenses },
    })
}

fn clean_form(form: CategoryForm) -> Result<(String, Option<String>)> {
    form.validate()?;

    let name = form.name.trim().to_string();
    if name.is_empty() {
        return Err(Error::invalid_field("name", "Name is required"));
    }

    Ok((
        name,
        crate::core::validation::normalize_optional_text(form.description),
    ))
}

fn name_conflict(err: Error) -> Error {
    match err {
        Error::Conflict { .. } => Error::Conflict {
            message: "A category with this name already exists".to_string(),
        },
        other => other,
    }
}

fn not_found(category_id: &str) -> Error {
    Error::NotFound {
        resource: RESOURCE,
        id: category_id.to_string(),
    }
}
