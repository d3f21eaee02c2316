//! Assignment endpoints.

use crate::{
    core::{access, assignment, audit, month},
    entities::AssignmentModel,
    errors::Result,
    http::{
        AppState,
        extract::{AuthUser, ClientMeta},
    },
};
use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

/// Body for assigning a member to a month.
#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    /// The month being assigned
    pub month_id: i64,
    /// The member receiving the month's payout
    pub user_id: i64,
}

/// `POST /api/assignments` - assigns a member to a month. Admin only.
///
/// Replaces any prior assignee and implicitly adds the member to the fund.
pub async fn assign_month(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ClientMeta(client): ClientMeta,
    Json(body): Json<AssignRequest>,
) -> Result<Json<AssignmentModel>> {
    access::require_admin(&caller)?;

    let saved =
        assignment::assign_user_to_month(&state.db, body.month_id, body.user_id, &caller).await?;
    let (month_row, fund_row) = month::get_month_and_fund(&state.db, body.month_id).await?;

    audit::log_action(
        &state.db,
        Some(caller.id),
        "MONTH_ASSIGNED",
        format!(
            "Assigned month {} (#{}) to user {}",
            month_row.month_name, month_row.month_number, body.user_id
        ),
        Some(fund_row.id),
        Some(serde_json::json!({
            "month_id": body.month_id,
            "user_id": body.user_id,
        })),
        &client,
    )
    .await?;

    Ok(Json(saved))
}

/// `DELETE /api/months/{id}/assignment` - clears a month's assignee. Admin only.
pub async fn unassign_month(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(month_id): Path<i64>,
    ClientMeta(client): ClientMeta,
) -> Result<Json<serde_json::Value>> {
    access::require_admin(&caller)?;

    let (month_row, fund_row) = month::get_month_and_fund(&state.db, month_id).await?;
    let removed = assignment::unassign_month(&state.db, month_id).await?;

    if removed {
        audit::log_action(
            &state.db,
            Some(caller.id),
            "MONTH_UNASSIGNED",
            format!(
                "Removed assignee from month {} (#{})",
                month_row.month_name, month_row.month_number
            ),
            Some(fund_row.id),
            None,
            &client,
        )
        .await?;
    }

    Ok(Json(serde_json::json!({
        "message": if removed { "Assignment removed" } else { "Month had no assignee" }
    })))
}
