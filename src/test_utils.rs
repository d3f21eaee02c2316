//! Shared test utilities.
//!
//! Common helpers for setting up an in-memory database and creating test
//! users and funds with sensible defaults.

use crate::{
    core::{access::Role, fund, user},
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Password used for every account created by these helpers.
pub const TEST_PASSWORD: &str = "password123";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates an admin account named `admin`.
pub async fn create_test_admin(db: &DatabaseConnection) -> Result<entities::user::Model> {
    user::create_user(
        db,
        "admin".to_string(),
        TEST_PASSWORD.to_string(),
        "Administrator".to_string(),
        Role::Admin,
        None,
        None,
    )
    .await
}

/// Creates a regular member account with the given username.
/// The full name is derived from the username.
pub async fn create_test_user(
    db: &DatabaseConnection,
    username: &str,
) -> Result<entities::user::Model> {
    let mut full_name = username.to_string();
    if let Some(first) = full_name.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    user::create_user(
        db,
        username.to_string(),
        TEST_PASSWORD.to_string(),
        format!("{full_name} Member"),
        Role::User,
        None,
        None,
    )
    .await
}

/// Creates the read-only guest account.
pub async fn create_test_guest(db: &DatabaseConnection) -> Result<entities::user::Model> {
    user::create_user(
        db,
        "guest".to_string(),
        "guest".to_string(),
        "Guest User".to_string(),
        Role::Guest,
        Some("GUEST".to_string()),
        None,
    )
    .await
}

/// Creates a fund with a two-month schedule.
///
/// # Defaults
/// * `total_amount`: 2000.0
/// * months: `"Jan"` and `"Feb"`, installment 100.0, payout 1000.0
pub async fn create_test_fund(
    db: &DatabaseConnection,
    name: &str,
    created_by: &entities::user::Model,
) -> Result<entities::fund::Model> {
    fund::create_fund(
        db,
        name.to_string(),
        "Test fund".to_string(),
        2000.0,
        vec![
            fund::NewMonth {
                month_name: "Jan".to_string(),
                installment_amount: 100.0,
                payment_amount: 1000.0,
            },
            fund::NewMonth {
                month_name: "Feb".to_string(),
                installment_amount: 100.0,
                payment_amount: 1000.0,
            },
        ],
        created_by,
    )
    .await
}

/// Sets up a database with an admin and one fund.
/// Returns (db, admin, fund) for common test scenarios.
pub async fn setup_with_fund() -> Result<(
    DatabaseConnection,
    entities::user::Model,
    entities::fund::Model,
)> {
    let db = setup_test_db().await?;
    let admin = create_test_admin(&db).await?;
    let fund = create_test_fund(&db, "Test Fund", &admin).await?;
    Ok((db, admin, fund))
}
