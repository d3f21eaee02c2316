//! Month schedule endpoints.

use crate::{
    core::{access, audit, month},
    entities::MonthModel,
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
use serde::Deserialize;

/// Body for adding a month to a fund.
#[derive(Debug, Deserialize)]
pub struct AddMonthRequest {
    /// Display name, e.g. `"Mar"`
    pub month_name: String,
    /// Slot number; next free slot when omitted
    pub month_number: Option<i32>,
    /// Installment every member pays
    pub installment_amount: f64,
    /// Payout the assignee receives
    pub payment_amount: f64,
    /// Calendar year; current year when omitted
    pub year: Option<i32>,
}

/// Body for updating a month. Omitted fields stay unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateMonthRequest {
    /// New display name
    pub month_name: Option<String>,
    /// New installment amount
    pub installment_amount: Option<f64>,
    /// New payout amount
    pub payment_amount: Option<f64>,
    /// New calendar year
    pub year: Option<i32>,
}

/// `GET /api/funds/{id}/months` - the schedule view for a fund.
pub async fn list_months(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(fund_id): Path<i64>,
) -> Result<Json<Vec<month::MonthOverview>>> {
    access::ensure_fund_view(&state.db, &caller, fund_id).await?;
    let overviews = month::month_overviews(&state.db, fund_id, &caller).await?;
    Ok(Json(overviews))
}

/// `POST /api/funds/{id}/months` - adds a month to the schedule. Admin only.
pub async fn add_month(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(fund_id): Path<i64>,
    ClientMeta(client): ClientMeta,
    Json(body): Json<AddMonthRequest>,
) -> Result<(StatusCode, Json<MonthModel>)> {
    access::require_admin(&caller)?;

    let created = month::add_month(
        &state.db,
        fund_id,
        body.month_name,
        body.month_number,
        body.installment_amount,
        body.payment_amount,
        body.year,
    )
    .await?;

    audit::log_action(
        &state.db,
        Some(caller.id),
        "MONTH_ADDED",
        format!(
            "Added month {} (#{}) to the schedule",
            created.month_name, created.month_number
        ),
        Some(fund_id),
        None,
        &client,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /api/months/{id}` - updates a month. Admin only.
pub async fn update_month(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(month_id): Path<i64>,
    ClientMeta(client): ClientMeta,
    Json(body): Json<UpdateMonthRequest>,
) -> Result<Json<MonthModel>> {
    access::require_admin(&caller)?;

    let updated = month::update_month(
        &state.db,
        month_id,
        body.month_name,
        body.installment_amount,
        body.payment_amount,
        body.year,
    )
    .await?;

    audit::log_action(
        &state.db,
        Some(caller.id),
        "MONTH_UPDATED",
        format!("Updated month {} (#{})", updated.month_name, updated.month_number),
        Some(updated.fund_id),
        None,
        &client,
    )
    .await?;

    Ok(Json(updated))
}
