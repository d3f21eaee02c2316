//! Installment payment and payout receipt endpoints.

use crate::{
    core::{
        access::{self, HasRole},
        audit, month,
        payment::{self, MarkOutcome, PaymentDetails},
    },
    entities::{InstallmentPaymentModel, MonthlyPaymentModel},
    errors::Result,
    http::{
        AppState,
        extract::{AuthUser, ClientMeta},
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

/// Query parameters for the payment list.
#[derive(Debug, Deserialize)]
pub struct PaymentListQuery {
    /// Restrict to one fund (admin view)
    pub fund_id: Option<i64>,
}

/// Body for marking an installment as paid.
#[derive(Debug, Deserialize)]
pub struct MarkPaymentRequest {
    /// Month the installment is for
    pub month_id: i64,
    /// Date the money actually moved
    pub payment_date: Option<chrono::DateTime<chrono::Utc>>,
    /// External transaction reference
    pub transaction_id: Option<String>,
    /// How the money moved
    pub transaction_type: Option<String>,
}

/// Body for marking a payout as received.
#[derive(Debug, Default, Deserialize)]
pub struct MarkPayoutRequest {
    /// Amount received; the month's payout amount when omitted
    pub amount: Option<f64>,
}

/// Response for a mark operation, reporting what actually happened.
#[derive(Debug, Serialize)]
pub struct MarkResponse<T> {
    /// Human-readable outcome
    pub message: &'static str,
    /// The payment row after the operation
    pub payment: T,
}

const fn outcome_message(outcome: MarkOutcome) -> &'static str {
    match outcome {
        MarkOutcome::Created => "Payment marked",
        MarkOutcome::AlreadyMarked => "Payment already marked",
        MarkOutcome::Resubmitted => "Payment resubmitted",
    }
}

/// `GET /api/payments` - admins see every payment (optionally one fund's);
/// everyone else sees their own.
pub async fn list_payments(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Query(query): Query<PaymentListQuery>,
) -> Result<Json<Vec<InstallmentPaymentModel>>> {
    let payments = if caller.role().is_admin() {
        match query.fund_id {
            Some(fund_id) => payment::list_installments_for_fund(&state.db, fund_id).await?,
            None => payment::list_all_installments(&state.db).await?,
        }
    } else {
        payment::list_installments_for_user(&state.db, caller.id).await?
    };
    Ok(Json(payments))
}

/// `POST /api/payments` - the caller marks their installment for a month.
pub async fn mark_payment(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ClientMeta(client): ClientMeta,
    Json(body): Json<MarkPaymentRequest>,
) -> Result<(StatusCode, Json<MarkResponse<InstallmentPaymentModel>>)> {
    // Membership and fund liveness gate the mark
    let (month_row, fund_row) = month::get_month_and_fund(&state.db, body.month_id).await?;
    access::ensure_fund_mutate(&state.db, &caller, fund_row.id).await?;

    let details = PaymentDetails {
        payment_date: body.payment_date,
        transaction_id: body.transaction_id,
        transaction_type: body.transaction_type,
    };
    let (marked, outcome) =
        payment::mark_installment(&state.db, body.month_id, &caller, details).await?;

    if outcome != MarkOutcome::AlreadyMarked {
        let action_type = if outcome == MarkOutcome::Resubmitted {
            "PAYMENT_RESUBMITTED"
        } else {
            "PAYMENT_MARKED"
        };
        audit::log_action(
            &state.db,
            Some(caller.id),
            action_type,
            format!(
                "Installment for month {} (#{}) marked as paid",
                month_row.month_name, month_row.month_number
            ),
            Some(fund_row.id),
            Some(serde_json::json!({ "payment_id": marked.id, "month_id": month_row.id })),
            &client,
        )
        .await?;
    }

    let status = if outcome == MarkOutcome::Created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(MarkResponse {
            message: outcome_message(outcome),
            payment: marked,
        }),
    ))
}

/// `POST /api/payments/{id}/verify` - accepts a pending installment. Admin only.
pub async fn verify_payment(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(payment_id): Path<i64>,
    ClientMeta(client): ClientMeta,
) -> Result<Json<InstallmentPaymentModel>> {
    let verified = payment::verify_installment(&state.db, payment_id, &caller).await?;
    let (month_row, fund_row) = month::get_month_and_fund(&state.db, verified.month_id).await?;

    audit::log_action(
        &state.db,
        Some(caller.id),
        "PAYMENT_VERIFIED",
        format!(
            "Verified installment of user {} for month {} (#{})",
            verified.user_id, month_row.month_name, month_row.month_number
        ),
        Some(fund_row.id),
        Some(serde_json::json!({ "payment_id": verified.id })),
        &client,
    )
    .await?;

    Ok(Json(verified))
}

/// `POST /api/payments/{id}/reject` - refuses a pending installment. Admin only.
pub async fn reject_payment(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(payment_id): Path<i64>,
    ClientMeta(client): ClientMeta,
) -> Result<Json<InstallmentPaymentModel>> {
    let rejected = payment::reject_installment(&state.db, payment_id, &caller).await?;
    let (month_row, fund_row) = month::get_month_and_fund(&state.db, rejected.month_id).await?;

    audit::log_action(
        &state.db,
        Some(caller.id),
        "PAYMENT_REJECTED",
        format!(
            "Rejected installment of user {} for month {} (#{})",
            rejected.user_id, month_row.month_name, month_row.month_number
        ),
        Some(fund_row.id),
        Some(serde_json::json!({ "payment_id": rejected.id })),
        &client,
    )
    .await?;

    Ok(Json(rejected))
}

/// `POST /api/months/{id}/payout` - the assignee marks the payout received.
pub async fn mark_payout(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(month_id): Path<i64>,
    ClientMeta(client): ClientMeta,
    body: Option<Json<MarkPayoutRequest>>,
) -> Result<(StatusCode, Json<MarkResponse<MonthlyPaymentModel>>)> {
    let (month_row, fund_row) = month::get_month_and_fund(&state.db, month_id).await?;
    access::ensure_fund_mutate(&state.db, &caller, fund_row.id).await?;

    let body = body.map(|Json(b)| b).unwrap_or_default();
    let (receipt, outcome) =
        payment::mark_payout_received(&state.db, month_id, &caller, body.amount).await?;

    if outcome != MarkOutcome::AlreadyMarked {
        let action_type = if outcome == MarkOutcome::Resubmitted {
            "PAYOUT_RESUBMITTED"
        } else {
            "PAYOUT_MARKED"
        };
        audit::log_action(
            &state.db,
            Some(caller.id),
            action_type,
            format!(
                "Payout for month {} (#{}) marked as received",
                month_row.month_name, month_row.month_number
            ),
            Some(fund_row.id),
            Some(serde_json::json!({ "receipt_id": receipt.id, "amount": receipt.amount })),
            &client,
        )
        .await?;
    }

    let status = if outcome == MarkOutcome::Created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(MarkResponse {
            message: outcome_message(outcome),
            payment: receipt,
        }),
    ))
}

/// `POST /api/payouts/{id}/verify` - accepts a pending payout receipt. Admin only.
pub async fn verify_payout(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(receipt_id): Path<i64>,
    ClientMeta(client): ClientMeta,
) -> Result<Json<MonthlyPaymentModel>> {
    let verified = payment::verify_payout(&state.db, receipt_id, &caller).await?;
    let (month_row, fund_row) = month::get_month_and_fund(&state.db, verified.month_id).await?;

    audit::log_action(
        &state.db,
        Some(caller.id),
        "PAYOUT_VERIFIED",
        format!(
            "Verified payout receipt for month {} (#{})",
            month_row.month_name, month_row.month_number
        ),
        Some(fund_row.id),
        Some(serde_json::json!({ "receipt_id": verified.id })),
        &client,
    )
    .await?;

    Ok(Json(verified))
}

/// `POST /api/payouts/{id}/reject` - refuses a pending payout receipt. Admin only.
pub async fn reject_payout(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(receipt_id): Path<i64>,
    ClientMeta(client): ClientMeta,
) -> Result<Json<MonthlyPaymentModel>> {
    let rejected = payment::reject_payout(&state.db, receipt_id, &caller).await?;
    let (month_row, fund_row) = month::get_month_and_fund(&state.db, rejected.month_id).await?;

    audit::log_action(
        &state.db,
        Some(caller.id),
        "PAYOUT_REJECTED",
        format!(
            "Rejected payout receipt for month {} (#{})",
            month_row.month_name, month_row.month_number
        ),
        Some(fund_row.id),
        Some(serde_json::json!({ "receipt_id": rejected.id })),
        &client,
    )
    .await?;

    Ok(Json(rejected))
}
