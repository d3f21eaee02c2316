//! Authentication endpoints: login, logout, current user.

use crate::{
    core::{audit, session, user},
    errors::{Error, Result},
    http::{
        AppState,
        extract::{AuthUser, ClientMeta, bearer_token},
        handlers::users::UserResponse,
    },
};
use axum::{Json, extract::State, http::HeaderMap};
use serde::{Deserialize, Serialize};

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login name
    pub username: String,
    /// Password in the clear; the transport is expected to be TLS
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Opaque bearer token for subsequent requests
    pub access_token: String,
    /// Always `"bearer"`
    pub token_type: &'static str,
    /// The logged-in user
    pub user: UserResponse,
}

/// `POST /api/login` - verifies credentials and opens a session.
pub async fn login(
    State(state): State<AppState>,
    ClientMeta(client): ClientMeta,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let Some(account) = user::authenticate(&state.db, &body.username, &body.password).await?
    else {
        audit::log_action(
            &state.db,
            None,
            "LOGIN_FAILED",
            format!("Failed login attempt for {:?}", body.username),
            None,
            None,
            &client,
        )
        .await?;
        return Err(Error::Unauthorized);
    };

    let session = session::create_session(
        &state.db,
        account.id,
        state.settings.session_ttl_days,
    )
    .await?;

    audit::log_action(
        &state.db,
        Some(account.id),
        "LOGIN",
        format!("User {} logged in", account.username),
        None,
        None,
        &client,
    )
    .await?;

    Ok(Json(LoginResponse {
        access_token: session.token,
        token_type: "bearer",
        user: UserResponse::from(account),
    }))
}

/// `POST /api/logout` - deletes the caller's session.
pub async fn logout(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ClientMeta(client): ClientMeta,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>> {
    if let Some(token) = bearer_token(&headers) {
        session::delete_session(&state.db, token).await?;
    }

    audit::log_action(
        &state.db,
        Some(caller.id),
        "LOGOUT",
        format!("User {} logged out", caller.username),
        None,
        None,
        &client,
    )
    .await?;

    Ok(Json(serde_json::json!({ "message": "Logged out" })))
}

/// `GET /api/me` - the authenticated user.
pub async fn me(AuthUser(caller): AuthUser) -> Json<UserResponse> {
    Json(UserResponse::from(caller))
}
