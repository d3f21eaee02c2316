//! Fund endpoints: dashboard, CRUD, flags, membership.

use crate::{
    core::{
        access::{self, HasRole, UserDisplay},
        audit, fund, month,
    },
    entities::FundModel,
    errors::Result,
    http::{
        AppState,
        extract::{AuthUser, ClientMeta},
    },
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

/// One dashboard row: a fund plus its statistics block.
#[derive(Debug, Serialize)]
pub struct FundSummary {
    /// The fund itself
    pub fund: FundModel,
    /// Counts shown on the dashboard card
    pub statistics: fund::FundStatistics,
}

/// Fund detail: the fund plus its schedule view.
#[derive(Debug, Serialize)]
pub struct FundDetail {
    /// The fund itself
    pub fund: FundModel,
    /// Per-month rows with assignee and payment progress
    pub months: Vec<month::MonthOverview>,
}

/// Body for creating a fund with its whole schedule.
#[derive(Debug, Deserialize)]
pub struct CreateFundRequest {
    /// Fund name
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Total pooled amount
    pub total_amount: f64,
    /// The month schedule, in order
    pub months: Vec<fund::NewMonth>,
}

/// Body for updating name/description.
#[derive(Debug, Deserialize)]
pub struct UpdateFundRequest {
    /// New name, unchanged when omitted
    pub name: Option<String>,
    /// New description, unchanged when omitted
    pub description: Option<String>,
}

/// Body for the guest visibility toggle.
#[derive(Debug, Deserialize)]
pub struct GuestVisibleRequest {
    /// Whether guests may view the fund
    pub guest_visible: bool,
}

/// A fund member as the viewer is allowed to see them.
#[derive(Debug, Serialize)]
pub struct MemberResponse {
    /// Member's user id
    pub id: i64,
    /// Privacy-filtered display fields
    #[serde(flatten)]
    pub display: UserDisplay,
}

/// `GET /api/funds` - the role-filtered dashboard list.
pub async fn list_funds(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<Vec<FundSummary>>> {
    let funds = fund::list_funds_for(&state.db, &caller).await?;
    let is_admin = caller.role().is_admin();

    let mut summaries = Vec::with_capacity(funds.len());
    for fund_row in funds {
        let statistics = fund::fund_statistics(&state.db, fund_row.id, is_admin).await?;
        summaries.push(FundSummary {
            fund: fund_row,
            statistics,
        });
    }

    Ok(Json(summaries))
}

/// `POST /api/funds` - creates a fund and its schedule. Admin only.
pub async fn create_fund(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ClientMeta(client): ClientMeta,
    Json(body): Json<CreateFundRequest>,
) -> Result<(StatusCode, Json<FundModel>)> {
    access::require_admin(&caller)?;

    let created = fund::create_fund(
        &state.db,
        body.name,
        body.description,
        body.total_amount,
        body.months,
        &caller,
    )
    .await?;

    audit::log_action(
        &state.db,
        Some(caller.id),
        "FUND_CREATED",
        format!("Created fund {}", created.name),
        Some(created.id),
        Some(serde_json::json!({
            "number_of_months": created.number_of_months,
            "total_amount": created.total_amount,
        })),
        &client,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/funds/{id}` - fund detail with the schedule view.
pub async fn get_fund(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(fund_id): Path<i64>,
) -> Result<Json<FundDetail>> {
    let fund_row = access::ensure_fund_view(&state.db, &caller, fund_id).await?;
    let months = month::month_overviews(&state.db, fund_id, &caller).await?;
    Ok(Json(FundDetail {
        fund: fund_row,
        months,
    }))
}

/// `PUT /api/funds/{id}` - updates name/description. Admin only.
pub async fn update_fund(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(fund_id): Path<i64>,
    ClientMeta(client): ClientMeta,
    Json(body): Json<UpdateFundRequest>,
) -> Result<Json<FundModel>> {
    access::require_admin(&caller)?;

    let updated = fund::update_fund(&state.db, fund_id, body.name, body.description).await?;

    audit::log_action(
        &state.db,
        Some(caller.id),
        "FUND_UPDATED",
        format!("Updated fund {}", updated.name),
        Some(updated.id),
        None,
        &client,
    )
    .await?;

    Ok(Json(updated))
}

/// `DELETE /api/funds/{id}` - soft delete. Admin only.
pub async fn delete_fund(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(fund_id): Path<i64>,
    ClientMeta(client): ClientMeta,
) -> Result<Json<serde_json::Value>> {
    access::require_admin(&caller)?;

    let deleted = fund::soft_delete_fund(&state.db, fund_id).await?;

    audit::log_action(
        &state.db,
        Some(caller.id),
        "FUND_DELETED",
        format!("Deleted fund {}", deleted.name),
        Some(deleted.id),
        None,
        &client,
    )
    .await?;

    Ok(Json(serde_json::json!({ "message": "Fund deleted" })))
}

/// `POST /api/funds/{id}/join` - the caller joins the fund.
pub async fn join_fund(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(fund_id): Path<i64>,
    ClientMeta(client): ClientMeta,
) -> Result<Json<serde_json::Value>> {
    let joined = fund::join_fund(&state.db, fund_id, &caller).await?;

    if joined {
        audit::log_action(
            &state.db,
            Some(caller.id),
            "FUND_JOINED",
            format!("User {} joined the fund", caller.username),
            Some(fund_id),
            None,
            &client,
        )
        .await?;
    }

    Ok(Json(serde_json::json!({
        "message": if joined { "Joined fund" } else { "Already a member" }
    })))
}

/// `POST /api/funds/{id}/archive` - sets the archived flag. Admin only.
pub async fn archive_fund(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(fund_id): Path<i64>,
    ClientMeta(client): ClientMeta,
) -> Result<Json<FundModel>> {
    access::require_admin(&caller)?;
    let updated = fund::set_archived(&state.db, fund_id, true).await?;

    audit::log_action(
        &state.db,
        Some(caller.id),
        "FUND_ARCHIVED",
        format!("Archived fund {}", updated.name),
        Some(updated.id),
        None,
        &client,
    )
    .await?;

    Ok(Json(updated))
}

/// `POST /api/funds/{id}/unarchive` - clears the archived flag. Admin only.
pub async fn unarchive_fund(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(fund_id): Path<i64>,
    ClientMeta(client): ClientMeta,
) -> Result<Json<FundModel>> {
    access::require_admin(&caller)?;
    let updated = fund::set_archived(&state.db, fund_id, false).await?;

    audit::log_action(
        &state.db,
        Some(caller.id),
        "FUND_UNARCHIVED",
        format!("Unarchived fund {}", updated.name),
        Some(updated.id),
        None,
        &client,
    )
    .await?;

    Ok(Json(updated))
}

/// `PUT /api/funds/{id}/guest-visible` - guest visibility toggle. Admin only.
pub async fn set_guest_visible(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(fund_id): Path<i64>,
    ClientMeta(client): ClientMeta,
    Json(body): Json<GuestVisibleRequest>,
) -> Result<Json<FundModel>> {
    access::require_admin(&caller)?;
    let updated = fund::set_guest_visible(&state.db, fund_id, body.guest_visible).await?;

    audit::log_action(
        &state.db,
        Some(caller.id),
        "FUND_GUEST_VISIBILITY",
        format!(
            "Fund {} is now {} to guests",
            updated.name,
            if body.guest_visible { "visible" } else { "hidden" }
        ),
        Some(updated.id),
        None,
        &client,
    )
    .await?;

    Ok(Json(updated))
}

/// `GET /api/funds/{id}/members` - privacy-filtered member list.
pub async fn list_members(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(fund_id): Path<i64>,
) -> Result<Json<Vec<MemberResponse>>> {
    access::ensure_fund_view(&state.db, &caller, fund_id).await?;

    let members = fund::list_members(&state.db, fund_id).await?;
    let response = members
        .iter()
        .map(|member| MemberResponse {
            id: member.id,
            display: access::display_info(member, &caller),
        })
        .collect();

    Ok(Json(response))
}
