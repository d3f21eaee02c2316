//! Login session business logic.
//!
//! Sessions are opaque uuid tokens with a fixed TTL, stored in their own
//! table. Lookup treats expired rows as absent; logout deletes the row.
//! There is deliberately no token signing or refresh machinery here.

use crate::{
    entities::{Session, User, session, user},
    errors::{Error, Result},
};
use chrono::Duration;
use sea_orm::{Set, prelude::*};

/// Creates a session for the user and returns the row carrying the token.
pub async fn create_session(
    db: &DatabaseConnection,
    user_id: i64,
    ttl_days: i64,
) -> Result<session::Model> {
    if ttl_days <= 0 {
        return Err(Error::Config {
            message: format!("Session TTL must be positive, got {ttl_days}"),
        });
    }

    let now = chrono::Utc::now();
    let new_session = session::ActiveModel {
        token: Set(uuid::Uuid::new_v4().to_string()),
        user_id: Set(user_id),
        created_at: Set(now),
        expires_at: Set(now + Duration::days(ttl_days)),
        ..Default::default()
    };
    new_session.insert(db).await.map_err(Into::into)
}

/// Resolves a bearer token to its user, ignoring expired sessions.
pub async fn get_session_user(
    db: &DatabaseConnection,
    token: &str,
) -> Result<Option<user::Model>> {
    let Some(found) = Session::find()
        .filter(session::Column::Token.eq(token))
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    if found.expires_at <= chrono::Utc::now() {
        return Ok(None);
    }

    User::find_by_id(found.user_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Deletes the session behind a token. Missing tokens are a no-op so logout
/// is idempotent.
pub async fn delete_session(db: &DatabaseConnection, token: &str) -> Result<()> {
    Session::delete_many()
        .filter(session::Column::Token.eq(token))
        .exec(db)
        .await?;
    Ok(())
}

/// Removes all expired session rows, returning how many were dropped.
pub async fn purge_expired(db: &DatabaseConnection) -> Result<u64> {
    let result = Session::delete_many()
        .filter(session::Column::ExpiresAt.lte(chrono::Utc::now()))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_session_round_trip() -> Result<()> {
        let db = setup_test_db().await?;
        let alice = create_test_user(&db, "alice").await?;

        let session = create_session(&db, alice.id, 30).await?;
        let resolved = get_session_user(&db, &session.token).await?;
        assert_eq!(resolved.unwrap().id, alice.id);

        delete_session(&db, &session.token).await?;
        assert!(get_session_user(&db, &session.token).await?.is_none());

        // Logout again is fine
        delete_session(&db, &session.token).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_token() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(get_session_user(&db, "not-a-token").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_expired_session_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let alice = create_test_user(&db, "alice").await?;
        let session = create_session(&db, alice.id, 30).await?;

        // Force the expiry into the past
        let mut active: crate::entities::session::ActiveModel = session.clone().into();
        active.expires_at = Set(chrono::Utc::now() - Duration::minutes(1));
        active.update(&db).await?;

        assert!(get_session_user(&db, &session.token).await?.is_none());

        // And the purge sweeps it away
        assert_eq!(purge_expired(&db).await?, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_ttl() -> Result<()> {
        let db = setup_test_db().await?;
        let alice = create_test_user(&db, "alice").await?;
        assert!(create_session(&db, alice.id, 0).await.is_err());
        Ok(())
    }
}
