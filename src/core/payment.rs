//! Payment lifecycle business logic.
//!
//! Installment payments and monthly payout receipts share one state
//! machine: `pending -> verified` (terminal), `pending -> rejected`, and
//! `rejected -> pending` when the member resubmits. A rejected row is
//! reused on resubmission rather than stacking new rows, and marking while
//! a pending or verified row exists returns that row unchanged.

use crate::{
    core::access::{self, HasRole},
    entities::{
        InstallmentPayment, Month, MonthlyPayment, installment_payment, month, monthly_payment,
        user,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Lifecycle state of a payment or payout receipt row.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PaymentStatus {
    /// Marked by a member, awaiting admin review
    Pending,
    /// Accepted by an admin; terminal
    Verified,
    /// Refused by an admin; the member may resubmit
    Rejected,
}

impl PaymentStatus {
    /// Parses the stored status string.
    #[must_use]
    pub fn parse(status: &str) -> Option<Self> {
        match status {
            "pending" => Some(Self::Pending),
            "verified" => Some(Self::Verified),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// The string form stored in the status columns.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
        }
    }
}

/// What happened when a member marked a payment.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MarkOutcome {
    /// A fresh row was created
    Created,
    /// A pending or verified row already covered this month
    AlreadyMarked,
    /// A rejected row was reset to pending with the new details
    Resubmitted,
}

/// Optional member-supplied details recorded when marking an installment.
#[derive(Clone, Debug, Default)]
pub struct PaymentDetails {
    /// Date the money actually moved
    pub payment_date: Option<chrono::DateTime<chrono::Utc>>,
    /// External transaction reference
    pub transaction_id: Option<String>,
    /// How the money moved (e.g. `"cash"`, `"transfer"`)
    pub transaction_type: Option<String>,
}

/// Marks an installment as paid for `(payer, month)`.
///
/// Idempotent while a pending or verified row exists; a rejected row is
/// reset to pending with the new details. The caller is responsible for
/// checking fund access first.
pub async fn mark_installment(
    db: &DatabaseConnection,
    month_id: i64,
    payer: &user::Model,
    details: PaymentDetails,
) -> Result<(installment_payment::Model, MarkOutcome)> {
    Month::find_by_id(month_id)
        .one(db)
        .await?
        .ok_or(Error::MonthNotFound { id: month_id })?;

    let rows = InstallmentPayment::find()
        .filter(installment_payment::Column::UserId.eq(payer.id))
        .filter(installment_payment::Column::MonthId.eq(month_id))
        .order_by_desc(installment_payment::Column::Id)
        .all(db)
        .await?;

    // A live (pending or verified) row wins over any rejected history
    if let Some(live) = rows
        .iter()
        .find(|p| PaymentStatus::parse(&p.status) != Some(PaymentStatus::Rejected))
    {
        return Ok((live.clone(), MarkOutcome::AlreadyMarked));
    }

    let now = chrono::Utc::now();

    if let Some(rejected) = rows.into_iter().next() {
        // Resubmission: the rejected row goes back to pending
        let mut active: installment_payment::ActiveModel = rejected.into();
        active.status = Set(PaymentStatus::Pending.as_str().to_string());
        active.paid_at = Set(now);
        active.marked_by = Set(payer.id);
        active.verified_by = Set(None);
        active.payment_date = Set(details.payment_date);
        active.transaction_id = Set(details.transaction_id);
        active.transaction_type = Set(details.transaction_type);
        let updated = active.update(db).await?;
        return Ok((updated, MarkOutcome::Resubmitted));
    }

    let created = installment_payment::ActiveModel {
        user_id: Set(payer.id),
        month_id: Set(month_id),
        paid_at: Set(now),
        payment_date: Set(details.payment_date),
        transaction_id: Set(details.transaction_id),
        transaction_type: Set(details.transaction_type),
        marked_by: Set(payer.id),
        verified_by: Set(None),
        status: Set(PaymentStatus::Pending.as_str().to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok((created, MarkOutcome::Created))
}

/// Admin accepts a pending installment payment.
pub async fn verify_installment(
    db: &DatabaseConnection,
    payment_id: i64,
    admin: &user::Model,
) -> Result<installment_payment::Model> {
    access::require_admin(admin)?;

    let payment = InstallmentPayment::find_by_id(payment_id)
        .one(db)
        .await?
        .ok_or(Error::PaymentNotFound { id: payment_id })?;

    if PaymentStatus::parse(&payment.status) != Some(PaymentStatus::Pending) {
        return Err(Error::validation(format!(
            "Only pending payments can be verified (status is {})",
            payment.status
        )));
    }

    let mut active: installment_payment::ActiveModel = payment.into();
    active.status = Set(PaymentStatus::Verified.as_str().to_string());
    active.verified_by = Set(Some(admin.id));
    active.update(db).await.map_err(Into::into)
}

/// Admin refuses a pending installment payment. The member may resubmit.
pub async fn reject_installment(
    db: &DatabaseConnection,
    payment_id: i64,
    admin: &user::Model,
) -> Result<installment_payment::Model> {
    access::require_admin(admin)?;

    let payment = InstallmentPayment::find_by_id(payment_id)
        .one(db)
        .await?
        .ok_or(Error::PaymentNotFound { id: payment_id })?;

    if PaymentStatus::parse(&payment.status) != Some(PaymentStatus::Pending) {
        return Err(Error::validation(format!(
            "Only pending payments can be rejected (status is {})",
            payment.status
        )));
    }

    let mut active: installment_payment::ActiveModel = payment.into();
    active.status = Set(PaymentStatus::Rejected.as_str().to_string());
    active.verified_by = Set(Some(admin.id));
    active.update(db).await.map_err(Into::into)
}

/// Finds an installment payment by primary key.
pub async fn get_installment_by_id(
    db: &DatabaseConnection,
    payment_id: i64,
) -> Result<Option<installment_payment::Model>> {
    InstallmentPayment::find_by_id(payment_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// A member's installment payments, newest first.
pub async fn list_installments_for_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<installment_payment::Model>> {
    InstallmentPayment::find()
        .filter(installment_payment::Column::UserId.eq(user_id))
        .order_by_desc(installment_payment::Column::PaidAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Every installment payment in the system, newest first. Admin-facing.
pub async fn list_all_installments(
    db: &DatabaseConnection,
) -> Result<Vec<installment_payment::Model>> {
    InstallmentPayment::find()
        .order_by_desc(installment_payment::Column::PaidAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// All installment payments inside one fund, newest first.
pub async fn list_installments_for_fund(
    db: &DatabaseConnection,
    fund_id: i64,
) -> Result<Vec<installment_payment::Model>> {
    InstallmentPayment::find()
        .inner_join(Month)
        .filter(month::Column::FundId.eq(fund_id))
        .order_by_desc(installment_payment::Column::PaidAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Marks a month's payout as received.
///
/// Only the month's assignee (or an admin acting for them) may mark the
/// receipt, and a month has at most one receipt row. Resubmission after
/// rejection reuses the row, same as installments.
pub async fn mark_payout_received(
    db: &DatabaseConnection,
    month_id: i64,
    marker: &user::Model,
    amount: Option<f64>,
) -> Result<(monthly_payment::Model, MarkOutcome)> {
    let month = Month::find_by_id(month_id)
        .one(db)
        .await?
        .ok_or(Error::MonthNotFound { id: month_id })?;

    let assignment = crate::core::assignment::get_assignment_for_month(db, month_id)
        .await?
        .ok_or_else(|| Error::validation("This month has no assignee yet"))?;

    if !marker.role().is_admin() && marker.id != assignment.user_id {
        return Err(Error::access_denied(
            "Only the assigned member can mark the payout as received",
        ));
    }

    let amount = amount.unwrap_or(month.payment_amount);
    if amount <= 0.0 || !amount.is_finite() {
        return Err(Error::validation("Payout amount must be positive"));
    }

    let existing = MonthlyPayment::find()
        .filter(monthly_payment::Column::MonthId.eq(month_id))
        .one(db)
        .await?;

    let now = chrono::Utc::now();

    match existing {
        Some(receipt)
            if PaymentStatus::parse(&receipt.status) != Some(PaymentStatus::Rejected) =>
        {
            Ok((receipt, MarkOutcome::AlreadyMarked))
        }
        Some(rejected) => {
            let mut active: monthly_payment::ActiveModel = rejected.into();
            active.user_id = Set(assignment.user_id);
            active.received_at = Set(now);
            active.amount = Set(amount);
            active.marked_by = Set(marker.id);
            active.verified_by = Set(None);
            active.status = Set(PaymentStatus::Pending.as_str().to_string());
            let updated = active.update(db).await?;
            Ok((updated, MarkOutcome::Resubmitted))
        }
        None => {
            let created = monthly_payment::ActiveModel {
                month_id: Set(month_id),
                user_id: Set(assignment.user_id),
                received_at: Set(now),
                amount: Set(amount),
                marked_by: Set(marker.id),
                verified_by: Set(None),
                status: Set(PaymentStatus::Pending.as_str().to_string()),
                ..Default::default()
            }
            .insert(db)
            .await?;
            Ok((created, MarkOutcome::Created))
        }
    }
}

/// Admin accepts a pending payout receipt.
pub async fn verify_payout(
    db: &DatabaseConnection,
    receipt_id: i64,
    admin: &user::Model,
) -> Result<monthly_payment::Model> {
    access::require_admin(admin)?;

    let receipt = MonthlyPayment::find_by_id(receipt_id)
        .one(db)
        .await?
        .ok_or(Error::PaymentNotFound { id: receipt_id })?;

    if PaymentStatus::parse(&receipt.status) != Some(PaymentStatus::Pending) {
        return Err(Error::validation(format!(
            "Only pending payouts can be verified (status is {})",
            receipt.status
        )));
    }

    let mut active: monthly_payment::ActiveModel = receipt.into();
    active.status = Set(PaymentStatus::Verified.as_str().to_string());
    active.verified_by = Set(Some(admin.id));
    active.update(db).await.map_err(Into::into)
}

/// Admin refuses a pending payout receipt.
pub async fn reject_payout(
    db: &DatabaseConnection,
    receipt_id: i64,
    admin: &user::Model,
) -> Result<monthly_payment::Model> {
    access::require_admin(admin)?;

    let receipt = MonthlyPayment::find_by_id(receipt_id)
        .one(db)
        .await?
        .ok_or(Error::PaymentNotFound { id: receipt_id })?;

    if PaymentStatus::parse(&receipt.status) != Some(PaymentStatus::Pending) {
        return Err(Error::validation(format!(
            "Only pending payouts can be rejected (status is {})",
            receipt.status
        )));
    }

    let mut active: monthly_payment::ActiveModel = receipt.into();
    active.status = Set(PaymentStatus::Rejected.as_str().to_string());
    active.verified_by = Set(Some(admin.id));
    active.update(db).await.map_err(Into::into)
}

/// Finds a payout receipt by primary key.
pub async fn get_payout_by_id(
    db: &DatabaseConnection,
    receipt_id: i64,
) -> Result<Option<monthly_payment::Model>> {
    MonthlyPayment::find_by_id(receipt_id)
        .one(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::{assignment as assignments, month as months};
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_mark_installment_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db).await?;
        let alice = create_test_user(&db, "alice").await?;
        let fund_row = create_test_fund(&db, "Family", &admin).await?;
        let schedule = months::list_months(&db, fund_row.id).await?;

        let (first, outcome) =
            mark_installment(&db, schedule[0].id, &alice, PaymentDetails::default()).await?;
        assert_eq!(outcome, MarkOutcome::Created);
        assert_eq!(first.status, "pending");

        let (again, outcome) =
            mark_installment(&db, schedule[0].id, &alice, PaymentDetails::default()).await?;
        assert_eq!(outcome, MarkOutcome::AlreadyMarked);
        assert_eq!(again.id, first.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_verify_then_mark_does_not_stack() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db).await?;
        let alice = create_test_user(&db, "alice").await?;
        let fund_row = create_test_fund(&db, "Family", &admin).await?;
        let schedule = months::list_months(&db, fund_row.id).await?;

        let (marked, _) =
            mark_installment(&db, schedule[0].id, &alice, PaymentDetails::default()).await?;
        let verified = verify_installment(&db, marked.id, &admin).await?;
        assert_eq!(verified.status, "verified");
        assert_eq!(verified.verified_by, Some(admin.id));

        let (row, outcome) =
            mark_installment(&db, schedule[0].id, &alice, PaymentDetails::default()).await?;
        assert_eq!(outcome, MarkOutcome::AlreadyMarked);
        assert_eq!(row.id, marked.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_reject_then_resubmit_returns_to_pending() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db).await?;
        let alice = create_test_user(&db, "alice").await?;
        let fund_row = create_test_fund(&db, "Family", &admin).await?;
        let schedule = months::list_months(&db, fund_row.id).await?;

        let (marked, _) =
            mark_installment(&db, schedule[0].id, &alice, PaymentDetails::default()).await?;
        let rejected = reject_installment(&db, marked.id, &admin).await?;
        assert_eq!(rejected.status, "rejected");

        // Resubmission reuses the row and returns it to pending
        let details = PaymentDetails {
            transaction_id: Some("TXN-42".to_string()),
            ..PaymentDetails::default()
        };
        let (resubmitted, outcome) =
            mark_installment(&db, schedule[0].id, &alice, details).await?;
        assert_eq!(outcome, MarkOutcome::Resubmitted);
        assert_eq!(resubmitted.id, marked.id);
        assert_eq!(resubmitted.status, "pending");
        assert_eq!(resubmitted.verified_by, None);
        assert_eq!(resubmitted.transaction_id.as_deref(), Some("TXN-42"));

        Ok(())
    }

    #[tokio::test]
    async fn test_rejected_never_verifies_without_resubmission() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db).await?;
        let alice = create_test_user(&db, "alice").await?;
        let fund_row = create_test_fund(&db, "Family", &admin).await?;
        let schedule = months::list_months(&db, fund_row.id).await?;

        let (marked, _) =
            mark_installment(&db, schedule[0].id, &alice, PaymentDetails::default()).await?;
        reject_installment(&db, marked.id, &admin).await?;

        // Verifying the rejected row outright is refused
        let direct = verify_installment(&db, marked.id, &admin).await;
        assert!(matches!(direct.unwrap_err(), Error::Validation { .. }));

        // After resubmission it can be verified
        let (resubmitted, _) =
            mark_installment(&db, schedule[0].id, &alice, PaymentDetails::default()).await?;
        let verified = verify_installment(&db, resubmitted.id, &admin).await?;
        assert_eq!(verified.status, "verified");

        Ok(())
    }

    #[tokio::test]
    async fn test_only_admin_verifies() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db).await?;
        let alice = create_test_user(&db, "alice").await?;
        let fund_row = create_test_fund(&db, "Family", &admin).await?;
        let schedule = months::list_months(&db, fund_row.id).await?;

        let (marked, _) =
            mark_installment(&db, schedule[0].id, &alice, PaymentDetails::default()).await?;

        let denied = verify_installment(&db, marked.id, &alice).await;
        assert!(matches!(
            denied.unwrap_err(),
            Error::AccessDenied { .. }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_payout_lifecycle() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db).await?;
        let alice = create_test_user(&db, "alice").await?;
        let bob = create_test_user(&db, "bob").await?;
        let fund_row = create_test_fund(&db, "Family", &admin).await?;
        let schedule = months::list_months(&db, fund_row.id).await?;

        // No assignee yet
        let unassigned = mark_payout_received(&db, schedule[0].id, &alice, None).await;
        assert!(unassigned.is_err());

        assignments::assign_user_to_month(&db, schedule[0].id, alice.id, &admin).await?;

        // Only the assignee (or an admin) may mark
        let wrong_user = mark_payout_received(&db, schedule[0].id, &bob, None).await;
        assert!(matches!(
            wrong_user.unwrap_err(),
            Error::AccessDenied { .. }
        ));

        let (receipt, outcome) =
            mark_payout_received(&db, schedule[0].id, &alice, None).await?;
        assert_eq!(outcome, MarkOutcome::Created);
        assert_eq!(receipt.status, "pending");
        // Amount defaults to the month's payout amount
        assert_eq!(receipt.amount, schedule[0].payment_amount);

        // One receipt per month
        let (again, outcome) =
            mark_payout_received(&db, schedule[0].id, &alice, Some(500.0)).await?;
        assert_eq!(outcome, MarkOutcome::AlreadyMarked);
        assert_eq!(again.id, receipt.id);

        // Reject, resubmit with corrected amount, verify
        reject_payout(&db, receipt.id, &admin).await?;
        let (resubmitted, outcome) =
            mark_payout_received(&db, schedule[0].id, &alice, Some(950.0)).await?;
        assert_eq!(outcome, MarkOutcome::Resubmitted);
        assert_eq!(resubmitted.status, "pending");
        assert_eq!(resubmitted.amount, 950.0);
        let verified = verify_payout(&db, resubmitted.id, &admin).await?;
        assert_eq!(verified.status, "verified");

        Ok(())
    }
}
