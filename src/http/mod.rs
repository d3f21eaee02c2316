//! HTTP layer - axum routes and request handlers.
//!
//! This module is the service's only surface. Handlers stay thin: they
//! extract the caller, call into [`crate::core`], and serialize the result.
//! All access and lifecycle rules live in the core modules.

/// Request extractors for the authenticated user and client metadata
pub mod extract;
/// Route handlers, one module per resource
pub mod handlers;

use crate::{config::Settings, errors::Result};
use axum::{
    Router,
    routing::{delete, get, post, put},
};
use sea_orm::DatabaseConnection;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Shared state available to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection for all database operations
    pub db: DatabaseConnection,
    /// Runtime settings (session TTL is read at login)
    pub settings: Settings,
}

impl AppState {
    /// Creates the shared state from a connection and settings.
    #[must_use]
    pub const fn new(db: DatabaseConnection, settings: Settings) -> Self {
        Self { db, settings }
    }
}

/// Assembles the full API router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Auth
        .route("/api/login", post(handlers::auth::login))
        .route("/api/logout", post(handlers::auth::logout))
        .route("/api/me", get(handlers::auth::me))
        // Users (admin)
        .route(
            "/api/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        // Funds
        .route(
            "/api/funds",
            get(handlers::funds::list_funds).post(handlers::funds::create_fund),
        )
        .route(
            "/api/funds/:fund_id",
            get(handlers::funds::get_fund)
                .put(handlers::funds::update_fund)
                .delete(handlers::funds::delete_fund),
        )
        .route("/api/funds/:fund_id/join", post(handlers::funds::join_fund))
        .route(
            "/api/funds/:fund_id/archive",
            post(handlers::funds::archive_fund),
        )
        .route(
            "/api/funds/:fund_id/unarchive",
            post(handlers::funds::unarchive_fund),
        )
        .route(
            "/api/funds/:fund_id/guest-visible",
            put(handlers::funds::set_guest_visible),
        )
        .route(
            "/api/funds/:fund_id/members",
            get(handlers::funds::list_members),
        )
        // Months
        .route(
            "/api/funds/:fund_id/months",
            get(handlers::months::list_months).post(handlers::months::add_month),
        )
        .route("/api/months/:month_id", put(handlers::months::update_month))
        // Assignments
        .route(
            "/api/assignments",
            post(handlers::assignments::assign_month),
        )
        .route(
            "/api/months/:month_id/assignment",
            delete(handlers::assignments::unassign_month),
        )
        // Payments
        .route(
            "/api/payments",
            get(handlers::payments::list_payments).post(handlers::payments::mark_payment),
        )
        .route(
            "/api/payments/:payment_id/verify",
            post(handlers::payments::verify_payment),
        )
        .route(
            "/api/payments/:payment_id/reject",
            post(handlers::payments::reject_payment),
        )
        .route(
            "/api/months/:month_id/payout",
            post(handlers::payments::mark_payout),
        )
        .route(
            "/api/payouts/:receipt_id/verify",
            post(handlers::payments::verify_payout),
        )
        .route(
            "/api/payouts/:receipt_id/reject",
            post(handlers::payments::reject_payout),
        )
        // Audit viewer
        .route("/api/audit-logs", get(handlers::audit::list_audit_logs))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds the listener and serves requests until the process stops.
pub async fn run_server(settings: Settings, db: DatabaseConnection) -> Result<()> {
    let bind_address = settings.bind_address.clone();
    let app = build_router(AppState::new(db, settings));

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Listening on http://{bind_address}");
    axum::serve(listener, app).await?;
    Ok(())
}
