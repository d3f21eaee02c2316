//! Month schedule business logic.
//!
//! Months are the slots of a fund's schedule. `month_number` is unique
//! within a fund and defaults to the next free slot on insert. The overview
//! builder assembles the per-month dashboard rows (assignee, installment
//! tally, payout status) with display names filtered through the privacy
//! rules.

use crate::{
    core::access::{self, UserDisplay},
    core::payment::PaymentStatus,
    entities::{
        Assignment, Fund, InstallmentPayment, Month, MonthlyPayment, User, assignment, fund,
        installment_payment, month, monthly_payment, user,
    },
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*};
use std::collections::HashMap;

/// Adds a month to a fund's schedule.
///
/// When `month_number` is omitted, the next free slot is used. An explicit
/// number that is already taken in this fund is rejected.
pub async fn add_month(
    db: &DatabaseConnection,
    fund_id: i64,
    month_name: String,
    month_number: Option<i32>,
    installment_amount: f64,
    payment_amount: f64,
    year: Option<i32>,
) -> Result<month::Model> {
    if month_name.trim().is_empty() {
        return Err(Error::validation("Month name cannot be empty"));
    }
    if installment_amount < 0.0 || payment_amount < 0.0 {
        return Err(Error::validation("Month amounts must be non-negative"));
    }

    let fund = Fund::find_by_id(fund_id)
        .one(db)
        .await?
        .ok_or(Error::FundNotFound { id: fund_id })?;

    let highest = Month::find()
        .filter(month::Column::FundId.eq(fund_id))
        .order_by_desc(month::Column::MonthNumber)
        .one(db)
        .await?;
    let next_number = highest.as_ref().map_or(1, |m| m.month_number + 1);
    let month_number = month_number.unwrap_or(next_number);

    if month_number < 1 {
        return Err(Error::validation("Month number must be positive"));
    }

    let taken = Month::find()
        .filter(month::Column::FundId.eq(fund_id))
        .filter(month::Column::MonthNumber.eq(month_number))
        .one(db)
        .await?;
    if taken.is_some() {
        return Err(Error::validation(format!(
            "Month number {month_number} already exists in this fund"
        )));
    }

    let year = year.unwrap_or_else(|| {
        use chrono::Datelike;
        chrono::Utc::now().year()
    });

    let created = month::ActiveModel {
        fund_id: Set(fund.id),
        month_name: Set(month_name.trim().to_string()),
        month_number: Set(month_number),
        installment_amount: Set(installment_amount),
        payment_amount: Set(payment_amount),
        year: Set(year),
        ..Default::default()
    }
    .insert(db)
    .await?;

    // Keep the fund's cached schedule length in step
    let months_total = Month::find()
        .filter(month::Column::FundId.eq(created.fund_id))
        .count(db)
        .await?;
    let mut fund_active: fund::ActiveModel = fund.into();
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    {
        fund_active.number_of_months = Set(months_total as i32);
    }
    fund_active.update(db).await?;

    Ok(created)
}

/// Updates a month's name, amounts, or year. `None` leaves a field alone.
pub async fn update_month(
    db: &DatabaseConnection,
    month_id: i64,
    month_name: Option<String>,
    installment_amount: Option<f64>,
    payment_amount: Option<f64>,
    year: Option<i32>,
) -> Result<month::Model> {
    let found = Month::find_by_id(month_id)
        .one(db)
        .await?
        .ok_or(Error::MonthNotFound { id: month_id })?;

    let mut active: month::ActiveModel = found.into();
    if let Some(name) = month_name {
        if name.trim().is_empty() {
            return Err(Error::validation("Month name cannot be empty"));
        }
        active.month_name = Set(name.trim().to_string());
    }
    if let Some(amount) = installment_amount {
        if amount < 0.0 {
            return Err(Error::validation("Installment amount must be non-negative"));
        }
        active.installment_amount = Set(amount);
    }
    if let Some(amount) = payment_amount {
        if amount < 0.0 {
            return Err(Error::validation("Payment amount must be non-negative"));
        }
        active.payment_amount = Set(amount);
    }
    if let Some(year) = year {
        active.year = Set(year);
    }
    active.update(db).await.map_err(Into::into)
}

/// A fund's months ordered by their slot number.
pub async fn list_months(db: &DatabaseConnection, fund_id: i64) -> Result<Vec<month::Model>> {
    Month::find()
        .filter(month::Column::FundId.eq(fund_id))
        .order_by_asc(month::Column::MonthNumber)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a month by primary key.
pub async fn get_month(db: &DatabaseConnection, month_id: i64) -> Result<Option<month::Model>> {
    Month::find_by_id(month_id).one(db).await.map_err(Into::into)
}

/// Loads a month together with its fund, erroring when either is gone.
pub async fn get_month_and_fund(
    db: &DatabaseConnection,
    month_id: i64,
) -> Result<(month::Model, fund::Model)> {
    let month = Month::find_by_id(month_id)
        .one(db)
        .await?
        .ok_or(Error::MonthNotFound { id: month_id })?;
    let fund = Fund::find_by_id(month.fund_id)
        .one(db)
        .await?
        .ok_or(Error::FundNotFound { id: month.fund_id })?;
    Ok((month, fund))
}

/// One row of the per-fund schedule view.
#[derive(Clone, Debug, serde::Serialize)]
pub struct MonthOverview {
    /// The month itself
    pub month: month::Model,
    /// Assignee's user id, when assigned
    pub assigned_user_id: Option<i64>,
    /// Assignee as the viewer is allowed to see them
    pub assigned_user: Option<UserDisplay>,
    /// Verified installment payments recorded for this month
    pub verified_installments: u64,
    /// Members expected to pay each month
    pub members_count: u64,
    /// Payout receipt status, when one has been marked
    pub payout_status: Option<String>,
}

/// Builds the schedule view for a fund, one row per month.
///
/// Display names go through the privacy rules for `viewer`, so a guest
/// receives customer ids where an admin receives real names.
pub async fn month_overviews(
    db: &DatabaseConnection,
    fund_id: i64,
    viewer: &user::Model,
) -> Result<Vec<MonthOverview>> {
    let months = list_months(db, fund_id).await?;

    let assignments: Vec<assignment::Model> = Assignment::find()
        .inner_join(Month)
        .filter(month::Column::FundId.eq(fund_id))
        .all(db)
        .await?;
    let assignment_by_month: HashMap<i64, &assignment::Model> =
        assignments.iter().map(|a| (a.month_id, a)).collect();

    // Resolve assignees in one query
    let assignee_ids: Vec<i64> = assignments.iter().map(|a| a.user_id).collect();
    let assignees: HashMap<i64, user::Model> = if assignee_ids.is_empty() {
        HashMap::new()
    } else {
        User::find()
            .filter(user::Column::Id.is_in(assignee_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect()
    };

    let verified: Vec<installment_payment::Model> = InstallmentPayment::find()
        .inner_join(Month)
        .filter(month::Column::FundId.eq(fund_id))
        .filter(installment_payment::Column::Status.eq(PaymentStatus::Verified.as_str()))
        .all(db)
        .await?;
    let mut verified_by_month: HashMap<i64, u64> = HashMap::new();
    for payment in &verified {
        *verified_by_month.entry(payment.month_id).or_default() += 1;
    }

    let receipts: Vec<monthly_payment::Model> = MonthlyPayment::find()
        .inner_join(Month)
        .filter(month::Column::FundId.eq(fund_id))
        .all(db)
        .await?;
    let receipt_by_month: HashMap<i64, &monthly_payment::Model> =
        receipts.iter().map(|p| (p.month_id, p)).collect();

    let members_count = crate::core::fund::list_members(db, fund_id)
        .await?
        .iter()
        .filter(|m| m.role == "user")
        .count() as u64;

    let overviews = months
        .into_iter()
        .map(|m| {
            let assignment = assignment_by_month.get(&m.id);
            let assigned_user_id = assignment.map(|a| a.user_id);
            let assigned_user = assignment
                .and_then(|a| assignees.get(&a.user_id))
                .map(|u| access::display_info(u, viewer));
            let verified_installments = verified_by_month.get(&m.id).copied().unwrap_or(0);
            let payout_status = receipt_by_month.get(&m.id).map(|p| p.status.clone());
            MonthOverview {
                month: m,
                assigned_user_id,
                assigned_user,
                verified_installments,
                members_count,
                payout_status,
            }
        })
        .collect();

    Ok(overviews)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::{assignment as assignments, payment};
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_add_month_defaults_to_next_slot() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db).await?;
        let fund_row = create_test_fund(&db, "Family", &admin).await?;

        let added = add_month(&db, fund_row.id, "Mar".to_string(), None, 100.0, 1000.0, None)
            .await?;
        assert_eq!(added.month_number, 3);

        let refreshed = crate::core::fund::get_fund_by_id(&db, fund_row.id)
            .await?
            .unwrap();
        assert_eq!(refreshed.number_of_months, 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_add_month_duplicate_number_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db).await?;
        let fund_row = create_test_fund(&db, "Family", &admin).await?;

        let duplicate = add_month(
            &db,
            fund_row.id,
            "Again".to_string(),
            Some(1),
            100.0,
            1000.0,
            None,
        )
        .await;

        assert!(matches!(
            duplicate.unwrap_err(),
            Error::Validation { .. }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_month() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db).await?;
        let fund_row = create_test_fund(&db, "Family", &admin).await?;
        let schedule = list_months(&db, fund_row.id).await?;

        let updated = update_month(
            &db,
            schedule[0].id,
            Some("January".to_string()),
            Some(150.0),
            None,
            None,
        )
        .await?;
        assert_eq!(updated.month_name, "January");
        assert_eq!(updated.installment_amount, 150.0);
        // Untouched field keeps its value
        assert_eq!(updated.payment_amount, schedule[0].payment_amount);

        let negative = update_month(&db, schedule[0].id, None, Some(-1.0), None, None).await;
        assert!(negative.is_err());

        Ok(())
    }

    #[tokio::test]
    async fn test_month_overviews() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db).await?;
        let alice = create_test_user(&db, "alice").await?;
        let guest = create_test_guest(&db).await?;
        let fund_row = create_test_fund(&db, "Family", &admin).await?;
        let schedule = list_months(&db, fund_row.id).await?;

        assignments::assign_user_to_month(&db, schedule[0].id, alice.id, &admin).await?;
        let (marked, _) = payment::mark_installment(
            &db,
            schedule[0].id,
            &alice,
            payment::PaymentDetails::default(),
        )
        .await?;
        payment::verify_installment(&db, marked.id, &admin).await?;

        let overview = month_overviews(&db, fund_row.id, &admin).await?;
        assert_eq!(overview.len(), 2);
        assert_eq!(overview[0].assigned_user_id, Some(alice.id));
        assert_eq!(overview[0].verified_installments, 1);
        assert_eq!(overview[1].assigned_user_id, None);
        assert_eq!(overview[1].verified_installments, 0);

        // Admin sees the assignee's real name, a guest only the identifier
        assert_eq!(
            overview[0].assigned_user.as_ref().unwrap().display_name,
            alice.full_name
        );
        let guest_view = month_overviews(&db, fund_row.id, &guest).await?;
        assert_eq!(
            guest_view[0].assigned_user.as_ref().unwrap().display_name,
            crate::core::access::identifier_for(&alice)
        );

        Ok(())
    }
}
