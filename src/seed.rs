//! Database seeding.
//!
//! Categories listed in config.toml are inserted at every start-up when
//! missing. The `seed` command additionally creates a demo account with a
//! handful of expenses dated in the current month. Both are idempotent.

use crate::{
    config::settings::CategorySeed,
    core::{
        category::{self, CategoryForm},
        dashboard::month_start,
        expense::{self, ExpenseForm},
        user::{self, SignupForm},
    },
    entities::{Expense, expense as expense_entity, user as user_entity},
    errors::Result,
};
use chrono::{SecondsFormat, TimeDelta, Utc};
use sea_orm::{DatabaseConnection, prelude::*};
use tracing::{debug, info};

/// Email of the demo account created by [`seed_demo_data`].
pub const DEMO_EMAIL: &str = "demo@example.com";
/// Password of the demo account.
pub const DEMO_PASSWORD: &str = "password123";

/// (amount, description, day offset into the month, payment method, category name)
const DEMO_EXPENSES: [(f64, &str, i64, &str, &str); 5] = [
    (45.99, "Notebooks and pens", 0, "Credit Card", "Office Supplies"),
    (299.99, "Flight to conference", 4, "Corporate Card", "Travel"),
    (99.99, "Adobe Creative Suite subscription", 9, "Credit Card", "Software"),
    (150.00, "Social media ads", 14, "Bank Transfer", "Marketing"),
    (499.99, "New laptop", 19, "Corporate Card", "Equipment"),
];

/// Categories the demo expenses are filed under.
pub fn demo_categories() -> Vec<CategorySeed> {
    [
        ("Office Supplies", "Stationery and office materials"),
        ("Travel", "Business travel expenses"),
        ("Software", "Software licenses and subscriptions"),
        ("Marketing", "Marketing and advertising costs"),
        ("Equipment", "Office equipment and furniture"),
    ]
    .into_iter()
    .map(|(name, description)| CategorySeed {
        name: name.to_string(),
        description: Some(description.to_string()),
    })
    .collect()
}

/// Inserts each seed category whose name does not exist yet.
///
/// Returns how many categories were created.
pub async fn seed_categories(db: &DatabaseConnection, seeds: &[CategorySeed]) -> Result<usize> {
    info!("Seeding categories. Found {} configurations.", seeds.len());
    let mut created = 0;

    for seed in seeds {
        if category::get_category_by_name(db, seed.name.trim()).await?.is_some() {
            debug!("Category '{}' already exists. Skipping.", seed.name);
            continue;
        }

        category::create_category(
            db,
            CategoryForm {
                name: seed.name.clone(),
                description: seed.description.clone(),
            },
        )
        .await?;
        created += 1;
    }

    Ok(created)
}

/// Creates the demo user, the demo categories and, if the demo user has no
/// expenses yet, the demo expenses.
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<user_entity::Model> {
    seed_categories(db, &demo_categories()).await?;

    let demo = match user::get_user_by_email(db, DEMO_EMAIL).await? {
        Some(existing) => existing,
        None => {
            user::create_user(
                db,
                SignupForm {
                    name: "Demo User".to_string(),
                    email: DEMO_EMAIL.to_string(),
                    password: DEMO_PASSWORD.to_string(),
                },
            )
            .await?
        }
    };
    info!("Demo user ready: {}", demo.email);

    let existing = Expense::find()
        .filter(expense_entity::Column::UserId.eq(demo.id.as_str()))
        .count(db)
        .await?;
    if existing > 0 {
        info!("Demo user already has {existing} expenses. Skipping expense seeding.");
        return Ok(demo);
    }

    let start = month_start(Utc::now());
    for (amount, description, day_offset, payment_method, category_name) in DEMO_EXPENSES {
        let Some(category) = category::get_category_by_name(db, category_name).await? else {
            debug!("Category '{category_name}' missing. Skipping demo expense.");
            continue;
        };

        let date = start + TimeDelta::days(day_offset);
        let record = expense::create_expense(
            db,
            &demo.id,
            ExpenseForm {
                amount,
                description: Some(description.to_string()),
                date: date.to_rfc3339_opts(SecondsFormat::Millis, true),
                payment_method: payment_method.to_string(),
                category_id: category.id,
            },
        )
        .await?;
        debug!("Created demo expense: {:?}", record.expense.description);
    }

    info!("Seeding completed!");
    Ok(demo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_seed_categories_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let seeds = demo_categories();

        assert_eq!(seed_categories(&db, &seeds).await?, 5);
        assert_eq!(seed_categories(&db, &seeds).await?, 0);
        assert_eq!(category::list_categories(&db).await?.len(), 5);
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_demo_data() -> Result<()> {
        let db = setup_test_db().await?;

        let demo = seed_demo_data(&db).await?;
        assert_eq!(demo.email, DEMO_EMAIL);
        assert_eq!(expense::list_expenses(&db, &demo.id).await?.len(), 5);

        // Running again neither duplicates the user nor the expenses
        let again = seed_demo_data(&db).await?;
        assert_eq!(again.id, demo.id);
        assert_eq!(expense::list_expenses(&db, &demo.id).await?.len(), 5);

        let verified = user::verify_credentials(&db, DEMO_EMAIL, DEMO_PASSWORD).await?;
        assert_eq!(verified.id, demo.id);
        Ok(())
    }
}
