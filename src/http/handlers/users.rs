//! User administration endpoints.

use crate::{
    core::{access, audit, user},
    entities::UserModel,
    errors::{Error, Result},
    http::{
        AppState,
        extract::{AuthUser, ClientMeta},
    },
};
use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

/// A user as exposed over the API. Never carries the password digest.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// Numeric id
    pub id: i64,
    /// Login name
    pub username: String,
    /// Real name
    pub full_name: String,
    /// Role string
    pub role: String,
    /// Customer-facing identifier
    pub customer_id: Option<String>,
    /// Public nickname
    pub alias: Option<String>,
    /// Account creation time
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<UserModel> for UserResponse {
    fn from(user: UserModel) -> Self {
        Self {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            role: user.role,
            customer_id: user.customer_id,
            alias: user.alias,
            created_at: user.created_at,
        }
    }
}

/// Body for creating an account.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    /// Unique login name
    pub username: String,
    /// Initial password
    pub password: String,
    /// Real name
    pub full_name: String,
    /// Role string, defaults to `"user"`
    #[serde(default = "default_role")]
    pub role: String,
    /// Explicit customer id; generated when omitted
    pub customer_id: Option<String>,
    /// Public nickname
    pub alias: Option<String>,
}

fn default_role() -> String {
    "user".to_string()
}

/// `GET /api/users` - all accounts. Admin only.
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<Vec<UserResponse>>> {
    access::require_admin(&caller)?;
    let users = user::list_users(&state.db).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// `POST /api/users` - creates an account. Admin only.
pub async fn create_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ClientMeta(client): ClientMeta,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    access::require_admin(&caller)?;

    // Only known roles are accepted; Role::parse would silently coerce typos
    if !matches!(body.role.as_str(), "admin" | "user" | "guest") {
        return Err(Error::validation(format!("Unknown role {:?}", body.role)));
    }

    let created = user::create_user(
        &state.db,
        body.username,
        body.password,
        body.full_name,
        access::Role::parse(&body.role),
        body.customer_id,
        body.alias,
    )
    .await?;

    audit::log_action(
        &state.db,
        Some(caller.id),
        "USER_CREATED",
        format!("Created {} account {}", created.role, created.username),
        None,
        Some(serde_json::json!({ "user_id": created.id, "role": created.role })),
        &client,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(created))))
}
