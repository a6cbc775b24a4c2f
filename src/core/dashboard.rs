//! Dashboard aggregation business logic.
//!
//! Computes, for one user, the spending since the start of the current month,
//! the same window grouped by category, and the most recently created
//! expenses. Summing and grouping are done by the database; category ids are
//! turned into names afterwards through an id -> name map.

use crate::{
    core::{category, expense::ExpenseRecord},
    entities::{Expense, expense},
    errors::Result,
};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use sea_orm::{FromQueryResult, QuerySelect, prelude::*, sea_query::Expr};
use serde::Serialize;
use std::collections::HashMap;

/// How many recent expenses the dashboard shows.
pub const RECENT_LIMIT: u64 = 5;

/// Label used for a grouped row whose category no longer exists.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Spending in one category over the dashboard window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    /// Category name, or [`UNKNOWN_CATEGORY`]
    pub category: String,
    /// Sum of amounts
    pub amount: f64,
    /// Number of expenses
    pub count: u64,
}

/// Everything the dashboard page renders.
#[derive(Debug, Clone)]
pub struct Dashboard {
    /// Start of the aggregation window
    pub month_start: DateTime<Utc>,
    /// Sum of amounts dated on or after `month_start`
    pub total: f64,
    /// Per-category totals for the same window, largest first
    pub by_category: Vec<CategoryTotal>,
    /// Most recently created expenses, not limited to the window
    pub recent: Vec<ExpenseRecord>,
}

/// Raw grouped row as returned by the database.
#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct CategoryTotalRow {
    /// Grouping key
    pub category_id: String,
    /// `SUM(amount)`
    pub total: Option<f64>,
    /// `COUNT(id)`
    pub count: i64,
}

/// First instant (00:00 UTC) of the month containing `now`.
#[must_use]
pub fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map_or(now, |midnight| midnight.and_utc())
}

/// Builds the dashboard for `owner_id` as of `now`.
pub async fn get_dashboard(
    db: &DatabaseConnection,
    owner_id: &str,
    now: DateTime<Utc>,
) -> Result<Dashboard> {
    let since = month_start(now);

    let total = total_since(db, owner_id, since).await?;
    let rows = totals_by_category_since(db, owner_id, since).await?;
    let recent = crate::core::expense::recent_expenses(db, owner_id, RECENT_LIMIT).await?;

    let ids = rows.iter().map(|row| row.category_id.clone()).collect();
    let names = category::category_names(db, ids).await?;

    Ok(Dashboard {
        month_start: since,
        total,
        by_category: label_category_totals(rows, &names),
        recent,
    })
}

/// Sum of the owner's expense amounts dated on or after `since`.
pub async fn total_since(
    db: &DatabaseConnection,
    owner_id: &str,
    since: DateTime<Utc>,
) -> Result<f64> {
    let total: Option<Option<f64>> = Expense::find()
        .select_only()
        .column_as(Expr::col(expense::Column::Amount).sum(), "total")
        .filter(expense::Column::UserId.eq(owner_id))
        .filter(expense::Column::Date.gte(since))
        .into_tuple()
        .one(db)
        .await?;

    Ok(total.flatten().unwrap_or(0.0))
}

/// Count and sum of the owner's expenses per category since `since`.
pub async fn totals_by_category_since(
    db: &DatabaseConnection,
    owner_id: &str,
    since: DateTime<Utc>,
) -> Result<Vec<CategoryTotalRow>> {
    Expense::find()
        .select_only()
        .column(expense::Column::CategoryId)
        .column_as(Expr::col(expense::Column::Amount).sum(), "total")
        .column_as(Expr::col(expense::Column::Id).count(), "count")
        .filter(expense::Column::UserId.eq(owner_id))
        .filter(expense::Column::Date.gte(since))
        .group_by(expense::Column::CategoryId)
        .into_model::<CategoryTotalRow>()
        .all(db)
        .await
        .map_err(Into::into)
}

/// Resolves grouped rows to display names, largest amount first.
#[must_use]
pub fn label_category_totals(
    rows: Vec<CategoryTotalRow>,
    names: &HashMap<String, String>,
) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = rows
        .into_iter()
        .map(|row| CategoryTotal {
            category: names
                .get(&row.category_id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string()),
            amount: row.total.unwrap_or(0.0),
            count: u64::try_from(row.count).unwrap_or(0),
        })
        .collect();

    totals.sort_by(|a, b| {
        b.amount
            .total_cmp(&a.amount)
            .then_with(|| a.category.cmp(&b.category))
    });
    totals
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use chrono::{TimeDelta, TimeZone};

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_month_start() {
        let now = Utc.with_ymd_and_hms(2026, 10, 17, 15, 42, 7).unwrap();
        assert_eq!(
            month_start(now),
            Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap()
        );

        let first = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(month_start(first), first);
    }

    #[test]
    fn test_label_category_totals_unknown() {
        let rows = vec![
            CategoryTotalRow {
                category_id: "a".to_string(),
                total: Some(10.0),
                count: 1,
            },
            CategoryTotalRow {
                category_id: "deleted".to_string(),
                total: Some(25.0),
                count: 2,
            },
            CategoryTotalRow {
                category_id: "b".to_string(),
                total: None,
                count: 0,
            },
        ];
        let names = HashMap::from([
            ("a".to_string(), "Travel".to_string()),
            ("b".to_string(), "Software".to_string()),
        ]);

        let totals = label_category_totals(rows, &names);
        assert_eq!(
            totals,
            vec![
                CategoryTotal {
                    category: UNKNOWN_CATEGORY.to_string(),
                    amount: 25.0,
                    count: 2
                },
                CategoryTotal {
                    category: "Travel".to_string(),
                    amount: 10.0,
                    count: 1
                },
                CategoryTotal {
                    category: "Software".to_string(),
                    amount: 0.0,
                    count: 0
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_dashboard_monthly_total() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let office = create_test_category(&db, "Office Supplies").await?;
        let travel = create_test_category(&db, "Travel").await?;
        let software = create_test_category(&db, "Software").await?;

        let now = Utc::now();
        let this_month = month_start(now) + TimeDelta::hours(1);
        create_dated_expense(&db, &user.id, &office.id, 45.99, this_month).await?;
        create_dated_expense(&db, &user.id, &travel.id, 299.99, this_month).await?;
        create_dated_expense(&db, &user.id, &software.id, 99.99, this_month).await?;

        let dashboard = get_dashboard(&db, &user.id, now).await?;
        assert_close(dashboard.total, 445.97);
        assert_eq!(dashboard.by_category.len(), 3);
        assert_eq!(dashboard.by_category[0].category, "Travel");
        assert_eq!(dashboard.recent.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_dashboard_window_and_grouping() -> Result<()> {
        let db = setup_test_db().await?;
        let alice = create_test_user(&db, "alice@example.com").await?;
        let bob = create_test_user(&db, "bob@example.com").await?;
        let travel = create_test_category(&db, "Travel").await?;
        let software = create_test_category(&db, "Software").await?;

        let now = Utc::now();
        let start = month_start(now);
        create_dated_expense(&db, &alice.id, &travel.id, 100.0, start).await?;
        create_dated_expense(&db, &alice.id, &travel.id, 50.0, start + TimeDelta::minutes(5)).await?;
        create_dated_expense(&db, &alice.id, &software.id, 20.0, start + TimeDelta::hours(2)).await?;
        // Last month, only counted in the recent list
        create_dated_expense(&db, &alice.id, &software.id, 999.0, start - TimeDelta::days(3)).await?;
        // Another user's spending never leaks in
        create_dated_expense(&db, &bob.id, &travel.id, 500.0, start).await?;

        let dashboard = get_dashboard(&db, &alice.id, now).await?;
        assert_close(dashboard.total, 170.0);
        assert_eq!(
            dashboard.by_category,
            vec![
                CategoryTotal {
                    category: "Travel".to_string(),
                    amount: 150.0,
                    count: 2
                },
                CategoryTotal {
                    category: "Software".to_string(),
                    amount: 20.0,
                    count: 1
                },
            ]
        );
        assert_eq!(dashboard.recent.len(), 4);
        assert!(dashboard.recent.iter().all(|r| r.expense.user_id == alice.id));
        Ok(())
    }

    #[tokio::test]
    async fn test_dashboard_recent_is_limited() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let travel = create_test_category(&db, "Travel").await?;
        for _ in 0..7 {
            create_test_expense(&db, &user.id, &travel.id, 1.0).await?;
        }

        let dashboard = get_dashboard(&db, &user.id, Utc::now()).await?;
        assert_eq!(dashboard.recent.len(), 5);
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_dashboard() -> Result<()> {
        let (db, user) = setup_with_user().await?;

        let dashboard = get_dashboard(&db, &user.id, Utc::now()).await?;
        assert_eq!(dashboard.total, 0.0);
        assert!(dashboard.by_category.is_empty());
        assert!(dashboard.recent.is_empty());
        Ok(())
    }
}
