//! Session business logic - issuing, resolving and revoking login sessions.
//!
//! Sessions live in the `sessions` table, so nothing about a login is held in
//! process memory. A token resolves only while `expires_at` is in the future.

use crate::{
    entities::{Session, User, session, user},
    errors::Result,
};
use chrono::{TimeDelta, Utc};
use sea_orm::{Set, prelude::*};

/// The authenticated user a request acts for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    /// User identifier, used to scope owned records
    pub id: String,
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
}

impl From<user::Model> for CurrentUser {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
        }
    }
}

/// Issues a new session for `user_id` valid for `ttl`.
pub async fn create_session(
    db: &DatabaseConnection,
    user_id: &str,
    ttl: TimeDelta,
) -> Result<session::Model> {
    let now = Utc::now();
    let session = session::ActiveModel {
        token: Set(Uuid::new_v4().simple().to_string()),
        user_id: Set(user_id.to_string()),
        created_at: Set(now),
        expires_at: Set(now + ttl),
    };

    session.insert(db).await.map_err(Into::into)
}

/// Resolves a token to its user, or `None` when unknown or expired.
pub async fn resolve_session(db: &DatabaseConnection, token: &str) -> Result<Option<CurrentUser>> {
    let found = Session::find_by_id(token.to_string())
        .filter(session::Column::ExpiresAt.gt(Utc::now()))
        .find_also_related(User)
        .one(db)
        .await?;

    Ok(found.and_then(|(_, user)| user).map(CurrentUser::from))
}

/// Revokes a session. Unknown tokens are ignored.
pub async fn delete_session(db: &DatabaseConnection, token: &str) -> Result<()> {
    Session::delete_by_id(token.to_string()).exec(db).await?;
    Ok(())
}

/// Removes every expired session, returning how many were deleted.
pub async fn purge_expired_sessions(db: &DatabaseConnection) -> Result<u64> {
    let result = Session::delete_many()
        .filter(session::Column::ExpiresAt.lte(Utc::now()))
        .exec(db)
        .await?;

    if result.rows_affected > 0 {
        tracing::debug!("Purged {} expired sessions", result.rows_affected);
    }
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_and_resolve_session() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "alice@example.com").await?;

        let session = create_session(&db, &user.id, TimeDelta::hours(1)).await?;
        assert_eq!(session.token.len(), 32);

        let current = resolve_session(&db, &session.token).await?.unwrap();
        assert_eq!(current.id, user.id);
        assert_eq!(current.email, "alice@example.com");

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_token_does_not_resolve() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(resolve_session(&db, "missing").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_expired_session_does_not_resolve() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "alice@example.com").await?;

        let expired = create_session(&db, &user.id, TimeDelta::hours(-1)).await?;
        assert!(resolve_session(&db, &expired.token).await?.is_none());

        let live = create_session(&db, &user.id, TimeDelta::hours(1)).await?;
        assert_eq!(purge_expired_sessions(&db).await?, 1);
        assert!(resolve_session(&db, &live.token).await?.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_session() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "alice@example.com").await?;
        let session = create_session(&db, &user.id, TimeDelta::hours(1)).await?;

        delete_session(&db, &session.token).await?;
        assert!(resolve_session(&db, &session.token).await?.is_none());

        // Deleting twice is harmless
        delete_session(&db, &session.token).await?;
        Ok(())
    }
}
