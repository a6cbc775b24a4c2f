//! Expense business logic - Handles all expense-related operations.
//!
//! Every function takes the owning user's id and filters on it, so a user can
//! never read, change or delete another user's expense: such a record simply
//! does not exist from their point of view and yields [`Error::NotFound`].
//! Lists are ordered by creation time, newest first.

use crate::{
    core::validation::{normalize_optional_text, parse_iso_datetime, validate_iso_datetime},
    entities::{Category, Expense, category, expense},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};
use serde::{Deserialize, Serialize};
use validator::Validate;

const RESOURCE: &str = "expense";

/// Payment methods offered by the expense form. The server accepts any
/// non-empty value.
pub const PAYMENT_METHODS: [&str; 5] = [
    "Cash",
    "Credit Card",
    "Debit Card",
    "Bank Transfer",
    "Corporate Card",
];

/// Expense create/update payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ExpenseForm {
    /// Amount spent, must be positive
    #[validate(range(exclusive_min = 0.0, message = "Amount must be positive"))]
    pub amount: f64,
    /// Optional note
    #[serde(default)]
    pub description: Option<String>,
    /// RFC 3339 datetime string
    #[validate(custom(function = "validate_iso_datetime"))]
    pub date: String,
    /// Free-text payment method
    #[serde(rename = "paymentMethod")]
    #[validate(length(min = 1, message = "Payment method is required"))]
    pub payment_method: String,
    /// Category the expense is filed under
    #[serde(rename = "categoryId")]
    #[validate(length(min = 1, message = "Category is required"))]
    pub category_id: String,
}

/// An expense with its category embedded, as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseRecord {
    /// The expense row
    #[serde(flatten)]
    pub expense: expense::Model,
    /// The referenced category, `None` if it no longer exists
    pub category: Option<category::Model>,
}

impl ExpenseRecord {
    /// Category name for display, `"Unknown"` when the category is gone.
    #[must_use]
    pub fn category_name(&self) -> &str {
        self.category
            .as_ref()
            .map_or(crate::core::dashboard::UNKNOWN_CATEGORY, |c| c.name.as_str())
    }
}

/// Validated and normalized expense fields.
struct CleanExpense {
    amount: f64,
    description: Option<String>,
    date: DateTime<Utc>,
    payment_method: String,
    category_id: String,
}

/// Lists the owner's expenses, newest created first.
pub async fn list_expenses(db: &DatabaseConnection, owner_id: &str) -> Result<Vec<ExpenseRecord>> {
    let rows = Expense::find()
        .filter(expense::Column::UserId.eq(owner_id))
        .find_also_related(Category)
        .order_by_desc(expense::Column::CreatedAt)
        .all(db)
        .await?;

    Ok(rows.into_iter().map(into_record).collect())
}

/// The owner's `limit` most recently created expenses.
pub async fn recent_expenses(
    db: &DatabaseConnection,
    owner_id: &str,
    limit: u64,
) -> Result<Vec<ExpenseRecord>> {
    let rows = Expense::find()
        .filter(expense::Column::UserId.eq(owner_id))
        .find_also_related(Category)
        .order_by_desc(expense::Column::CreatedAt)
        .limit(limit)
        .all(db)
        .await?;

    Ok(rows.into_iter().map(into_record).collect())
}

/// Fetches one of the owner's expenses, or [`Error::NotFound`].
pub async fn get_expense(
    db: &DatabaseConnection,
    owner_id: &str,
    expense_id: &str,
) -> Result<ExpenseRecord> {
    Expense::find_by_id(expense_id.to_string())
        .filter(expense::Column::UserId.eq(owner_id))
        .find_also_related(Category)
        .one(db)
        .await?
        .map(into_record)
        .ok_or_else(|| not_found(expense_id))
}

/// Records a new expense for the owner.
pub async fn create_expense(
    db: &DatabaseConnection,
    owner_id: &str,
    form: ExpenseForm,
) -> Result<ExpenseRecord> {
    let clean = clean_form(form)?;
    let category = require_category(db, &clean.category_id).await?;

    let expense = expense::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        amount: Set(clean.amount),
        description: Set(clean.description),
        date: Set(clean.date),
        payment_method: Set(clean.payment_method),
        category_id: Set(clean.category_id),
        user_id: Set(owner_id.to_string()),
        created_at: Set(Utc::now()),
    };

    let created = expense.insert(db).await?;
    tracing::debug!("Created expense {} for user {owner_id}", created.id);

    Ok(ExpenseRecord {
        expense: created,
        category: Some(category),
    })
}

/// Replaces the fields of one of the owner's expenses.
pub async fn update_expense(
    db: &DatabaseConnection,
    owner_id: &str,
    expense_id: &str,
    form: ExpenseForm,
) -> Result<ExpenseRecord> {
    let clean = clean_form(form)?;

    let existing = Expense::find_by_id(expense_id.to_string())
        .filter(expense::Column::UserId.eq(owner_id))
        .one(db)
        .await?
        .ok_or_else(|| not_found(expense_id))?;

    let category = require_category(db, &clean.category_id).await?;

    let mut active: expense::ActiveModel = existing.into();
    active.amount = Set(clean.amount);
    active.description = Set(clean.description);
    active.date = Set(clean.date);
    active.payment_method = Set(clean.payment_method);
    active.category_id = Set(clean.category_id);
    let updated = active.update(db).await?;

    Ok(ExpenseRecord {
        expense: updated,
        category: Some(category),
    })
}

/// Deletes one of the owner's expenses, or returns [`Error::NotFound`].
pub async fn delete_expense(db: &DatabaseConnection, owner_id: &str, expense_id: &str) -> Result<()> {
    let result = Expense::delete_many()
        .filter(expense::Column::Id.eq(expense_id))
        .filter(expense::Column::UserId.eq(owner_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(not_found(expense_id));
    }

    tracing::debug!("Deleted expense {expense_id} for user {owner_id}");
    Ok(())
}

fn clean_form(form: ExpenseForm) -> Result<CleanExpense> {
    form.validate()?;

    if !form.amount.is_finite() {
        return Err(Error::invalid_field("amount", "Amount must be positive"));
    }

    let payment_method = form.payment_method.trim().to_string();
    if payment_method.is_empty() {
        return Err(Error::invalid_field(
            "paymentMethod",
            "Payment method is required",
        ));
    }

    let category_id = form.category_id.trim().to_string();
    if category_id.is_empty() {
        return Err(Error::invalid_field("categoryId", "Category is required"));
    }

    Ok(CleanExpense {
        amount: form.amount,
        description: normalize_optional_text(form.description),
        date: parse_iso_datetime("date", &form.date)?,
        payment_method,
        category_id,
    })
}

async fn require_category(db: &DatabaseConnection, category_id: &str) -> Result<category::Model> {
    Category::find_by_id(category_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| Error::invalid_field("categoryId", "Category does not exist"))
}

fn into_record((expense, category): (expense::Model, Option<category::Model>)) -> ExpenseRecord {
    ExpenseRecord { expense, category }
}

fn not_found(expense_id: &str) -> Error {
    Error::NotFound {
        resource: RESOURCE,
        id: expense_id.to_string(),
    }
}
