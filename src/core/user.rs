//! User account business logic.
//!
//! Handles account creation with duplicate-username rejection, customer id
//! generation, credential verification, and startup seeding of the built-in
//! `admin` and `guest` accounts. Passwords are stored as `salt$digest` where
//! the digest is sha-256 over salt and password.

use crate::{
    core::access::Role,
    entities::{User, user},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use sha2::{Digest, Sha256};
use tracing::info;

/// Produces a fresh `salt$digest` string for storing a password.
#[must_use]
pub fn hash_password(password: &str) -> String {
    let salt = uuid::Uuid::new_v4().simple().to_string();
    let digest = Sha256::new()
        .chain_update(salt.as_bytes())
        .chain_update(password.as_bytes())
        .finalize();
    format!("{salt}${digest:x}")
}

/// Checks a candidate password against a stored `salt$digest` string.
#[must_use]
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt, expected)) = stored.split_once('$') else {
        return false;
    };
    let digest = Sha256::new()
        .chain_update(salt.as_bytes())
        .chain_update(password.as_bytes())
        .finalize();
    format!("{digest:x}") == expected
}

/// Creates a new user account.
///
/// Usernames are unique; a duplicate surfaces as a validation error so the
/// caller can report it as a 400. When no customer id is supplied, one is
/// generated from the numeric id in the `C{id:03}` format.
pub async fn create_user(
    db: &DatabaseConnection,
    username: String,
    password: String,
    full_name: String,
    role: Role,
    customer_id: Option<String>,
    alias: Option<String>,
) -> Result<user::Model> {
    let username = username.trim().to_string();
    if username.is_empty() {
        return Err(Error::validation("Username cannot be empty"));
    }
    if password.is_empty() {
        return Err(Error::validation("Password cannot be empty"));
    }
    if full_name.trim().is_empty() {
        return Err(Error::validation("Full name cannot be empty"));
    }

    let existing = User::find()
        .filter(user::Column::Username.eq(&username))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(Error::validation("Username already exists"));
    }

    let new_user = user::ActiveModel {
        username: Set(username),
        password_hash: Set(hash_password(&password)),
        full_name: Set(full_name.trim().to_string()),
        role: Set(role.as_str().to_string()),
        customer_id: Set(customer_id),
        alias: Set(alias),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let inserted = new_user.insert(db).await?;

    // Generate the customer id from the assigned primary key when absent
    if inserted.customer_id.is_none() {
        let customer_id = format!("C{:03}", inserted.id);
        let mut active: user::ActiveModel = inserted.into();
        active.customer_id = Set(Some(customer_id));
        return active.update(db).await.map_err(Into::into);
    }

    Ok(inserted)
}

/// Verifies a username/password pair, returning the user on success.
pub async fn authenticate(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<Option<user::Model>> {
    let Some(found) = User::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    if verify_password(password, &found.password_hash) {
        Ok(Some(found))
    } else {
        Ok(None)
    }
}

/// Finds a user by primary key.
pub async fn get_user_by_id(db: &DatabaseConnection, user_id: i64) -> Result<Option<user::Model>> {
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Finds a user by username.
pub async fn get_user_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await
        .map_err(Into::into)
}

/// All accounts, ordered by username. Admin-facing.
pub async fn list_users(db: &DatabaseConnection) -> Result<Vec<user::Model>> {
    User::find()
        .order_by_asc(user::Column::Username)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Accounts with the regular `user` role, the assignable population.
pub async fn list_regular_users(db: &DatabaseConnection) -> Result<Vec<user::Model>> {
    User::find()
        .filter(user::Column::Role.eq(Role::User.as_str()))
        .order_by_asc(user::Column::Username)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Updates a user's public alias.
pub async fn update_alias(
    db: &DatabaseConnection,
    user_id: i64,
    alias: Option<String>,
) -> Result<user::Model> {
    let found = get_user_by_id(db, user_id)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            user: user_id.to_string(),
        })?;

    let mut active: user::ActiveModel = found.into();
    active.alias = Set(alias);
    active.update(db).await.map_err(Into::into)
}

/// Ensures the built-in `admin` and `guest` accounts exist.
///
/// Idempotent; intended to run once at startup. The admin password comes
/// from `ADMIN_PASSWORD` when set so fresh deployments don't go live with
/// the development default.
pub async fn seed_default_users(db: &DatabaseConnection) -> Result<()> {
    if get_user_by_username(db, "admin").await?.is_none() {
        let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin".to_string());
        create_user(
            db,
            "admin".to_string(),
            password,
            "Administrator".to_string(),
            Role::Admin,
            None,
            None,
        )
        .await?;
        info!("Seeded built-in admin account");
    }

    if get_user_by_username(db, "guest").await?.is_none() {
        create_user(
            db,
            "guest".to_string(),
            "guest".to_string(),
            "Guest User".to_string(),
            Role::Guest,
            Some("GUEST".to_string()),
            None,
        )
        .await?;
        info!("Seeded built-in guest account");
    }

    Ok(())
}
