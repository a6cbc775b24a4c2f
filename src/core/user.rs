//! User business logic - sign-up and credential checks.
//!
//! Passwords are hashed with Argon2id and a random salt; only the PHC string
//! is stored. Emails are compared case-insensitively by normalizing them to
//! lowercase before they reach the database.

use crate::{
    entities::{User, user},
    errors::{Error, Result},
};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{Set, prelude::*};
use serde::Deserialize;
use validator::Validate;

/// Sign-up form fields.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupForm {
    /// Display name
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    /// Login email
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    /// Plain-text password, hashed before storage
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Creates a user after validating the form and hashing the password.
///
/// A duplicate email surfaces as [`Error::Conflict`].
pub async fn create_user(db: &DatabaseConnection, form: SignupForm) -> Result<user::Model> {
    form.validate()?;
    let name = form.name.trim();
    if name.is_empty() {
        return Err(Error::invalid_field("name", "Name is required"));
    }

    let email = normalize_email(&form.email);
    if get_user_by_email(db, &email).await?.is_some() {
        return Err(Error::Conflict {
            message: "An account with this email already exists".to_string(),
        });
    }

    let user = user::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        name: Set(name.to_string()),
        email: Set(email),
        password_hash: Set(hash_password(&form.password)?),
        created_at: Set(chrono::Utc::now()),
    };

    let created = user.insert(db).await?;
    tracing::info!("Created user {}", created.email);
    Ok(created)
}

/// Finds a user by email, ignoring case.
pub async fn get_user_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::Email.eq(normalize_email(email)))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns the user when the email exists and the password matches.
///
/// Unknown emails and wrong passwords both yield [`Error::Unauthorized`].
pub async fn verify_credentials(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> Result<user::Model> {
    let user = get_user_by_email(db, email)
        .await?
        .ok_or(Error::Unauthorized)?;

    if verify_password(password, &user.password_hash)? {
        Ok(user)
    } else {
        tracing::debug!("Password mismatch for {}", user.email);
        Err(Error::Unauthorized)
    }
}

/// Hashes a password into an Argon2id PHC string.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Checks a password against a stored PHC string.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(other) => Err(other.into()),
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_hash_and_verify_password() -> Result<()> {
        let hash = hash_password("password123")?;
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("password123", &hash)?);
        assert!(!verify_password("password124", &hash)?);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_user_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_user(
            &db,
            SignupForm {
                name: String::new(),
                email: "not-an-email".to_string(),
                password: "123".to_string(),
            },
        )
        .await;

        match result.unwrap_err() {
            Error::Validation { fields } => {
                let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
                assert_eq!(names, vec!["email", "name", "password"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(User::find().all(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_user_blank_name() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_user(
            &db,
            SignupForm {
                name: "   ".to_string(),
                email: "blank@example.com".to_string(),
                password: "password123".to_string(),
            },
        )
        .await;

        match result.unwrap_err() {
            Error::Validation { fields } => {
                assert_eq!(fields[0].field, "name");
                assert_eq!(fields[0].message, "Name is required");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(User::find().all(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_user_duplicate_email() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, "dup@example.com").await?;

        let result = create_user(
            &db,
            SignupForm {
                name: "Another".to_string(),
                email: "DUP@example.com".to_string(),
                password: "password123".to_string(),
            },
        )
        .await;

        assert!(matches!(result, Err(Error::Conflict { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_verify_credentials() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "alice@example.com").await?;

        let found = verify_credentials(&db, " Alice@Example.com ", TEST_PASSWORD).await?;
        assert_eq!(found.id, user.id);

        let wrong = verify_credentials(&db, "alice@example.com", "wrong-password").await;
        assert!(matches!(wrong, Err(Error::Unauthorized)));

        let unknown = verify_credentials(&db, "nobody@example.com", TEST_PASSWORD).await;
        assert!(matches!(unknown, Err(Error::Unauthorized)));

        Ok(())
    }
}
