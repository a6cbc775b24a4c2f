//! Shared test utilities for the expense manager.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

#![allow(clippy::expect_used)]

use crate::{
    core::session,
    entities::{category, expense, user},
    errors::Result,
};
use chrono::{DateTime, TimeDelta, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

/// Password every test user is created with.
pub const TEST_PASSWORD: &str = "password123";

/// Routes test logs through the test harness; safe to call repeatedly.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    init_test_tracing();
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Argon2 hashing is slow in debug builds, so the hash is computed once.
fn test_password_hash() -> &'static str {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| {
        crate::core::user::hash_password(TEST_PASSWORD).expect("hashing the test password")
    })
}

/// Creates a user with [`TEST_PASSWORD`].
///
/// # Defaults
/// * `name`: the part of the email before `@`
pub async fn create_test_user(db: &DatabaseConnection, email: &str) -> Result<user::Model> {
    let name = email.split('@').next().unwrap_or(email).to_string();
    let user = user::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        name: Set(name),
        email: Set(email.to_string()),
        password_hash: Set(test_password_hash().to_string()),
        created_at: Set(Utc::now()),
    };
    Ok(user.insert(db).await?)
}

/// Sets up a test database with one user.
/// Returns (db, user) for common test scenarios.
pub async fn setup_with_user() -> Result<(DatabaseConnection, user::Model)> {
    let db = setup_test_db().await?;
    let user = create_test_user(&db, "test@example.com").await?;
    Ok((db, user))
}

/// Creates a category without a description.
pub async fn create_test_category(db: &DatabaseConnection, name: &str) -> Result<category::Model> {
    let category = category::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        name: Set(name.to_string()),
        description: Set(None),
        created_at: Set(Utc::now()),
    };
    Ok(category.insert(db).await?)
}

/// Creates an expense dated now.
///
/// # Defaults
/// * `description`: `"Test expense"`
/// * `payment_method`: `"Credit Card"`
pub async fn create_test_expense(
    db: &DatabaseConnection,
    user_id: &str,
    category_id: &str,
    amount: f64,
) -> Result<expense::Model> {
    create_dated_expense(db, user_id, category_id, amount, Utc::now()).await
}

/// Creates an expense with an explicit `date`.
pub async fn create_dated_expense(
    db: &DatabaseConnection,
    user_id: &str,
    category_id: &str,
    amount: f64,
    date: DateTime<Utc>,
) -> Result<expense::Model> {
    let expense = expense::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        amount: Set(amount),
        description: Set(Some("Test expense".to_string())),
        date: Set(date),
        payment_method: Set("Credit Card".to_string()),
        category_id: Set(category_id.to_string()),
        user_id: Set(user_id.to_string()),
        created_at: Set(Utc::now()),
    };
    Ok(expense.insert(db).await?)
}

/// Issues a one-hour session and returns its token.
pub async fn create_test_session(db: &DatabaseConnection, user_id: &str) -> Result<String> {
    let session = session::create_session(db, user_id, TimeDelta::hours(1)).await?;
    Ok(session.token)
}
