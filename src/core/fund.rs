//! Fund business logic.
//!
//! Funds are created by admins together with their whole month schedule in
//! one transaction. Membership, the archive/soft-delete/guest-visible flags,
//! joining, and the dashboard statistics all live here; the access rules
//! that consume the flags are in [`crate::core::access`].

use crate::{
    core::access::{HasRole, Role},
    core::payment::PaymentStatus,
    entities::{
        Assignment, Fund, FundMember, InstallmentPayment, Month, MonthlyPayment, User, fund,
        fund_member, installment_payment, month, monthly_payment, user,
    },
    errors::{Error, Result},
};
use chrono::Datelike;
use sea_orm::{PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::HashSet;

/// One month slot in a fund-creation request.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct NewMonth {
    /// Display name, e.g. `"Jan"`
    pub month_name: String,
    /// Installment every member pays this month
    pub installment_amount: f64,
    /// Payout the assigned member receives this month
    pub payment_amount: f64,
}

/// Creates a fund with its full month schedule.
///
/// The creator becomes the first member, and months are numbered from 1 in
/// the order given. Everything happens in one transaction so a bad month row
/// never leaves a half-created fund behind.
pub async fn create_fund(
    db: &DatabaseConnection,
    name: String,
    description: String,
    total_amount: f64,
    months: Vec<NewMonth>,
    created_by: &user::Model,
) -> Result<fund::Model> {
    if name.trim().is_empty() {
        return Err(Error::validation("Fund name cannot be empty"));
    }
    if months.is_empty() {
        return Err(Error::validation("At least one month is required"));
    }
    if total_amount < 0.0 || !total_amount.is_finite() {
        return Err(Error::validation("Total amount must be non-negative"));
    }
    for slot in &months {
        if slot.month_name.trim().is_empty() {
            return Err(Error::validation("Month name cannot be empty"));
        }
        if slot.installment_amount < 0.0 || slot.payment_amount < 0.0 {
            return Err(Error::validation("Month amounts must be non-negative"));
        }
    }

    let txn = db.begin().await?;
    let now = chrono::Utc::now();

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    let number_of_months = months.len() as i32;

    let created = fund::ActiveModel {
        name: Set(name.trim().to_string()),
        description: Set(description),
        total_amount: Set(total_amount),
        number_of_months: Set(number_of_months),
        created_by: Set(created_by.id),
        created_at: Set(now),
        is_archived: Set(false),
        is_deleted: Set(false),
        guest_visible: Set(false),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    // The creator is implicitly the first member
    fund_member::ActiveModel {
        fund_id: Set(created.id),
        user_id: Set(created_by.id),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let year = now.year();
    for (index, slot) in months.into_iter().enumerate() {
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let month_number = (index + 1) as i32;
        month::ActiveModel {
            fund_id: Set(created.id),
            month_name: Set(slot.month_name.trim().to_string()),
            month_number: Set(month_number),
            installment_amount: Set(slot.installment_amount),
            payment_amount: Set(slot.payment_amount),
            year: Set(year),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;
    Ok(created)
}

/// Finds a fund by primary key, soft-deleted rows included.
pub async fn get_fund_by_id(db: &DatabaseConnection, fund_id: i64) -> Result<Option<fund::Model>> {
    Fund::find_by_id(fund_id).one(db).await.map_err(Into::into)
}

/// The funds a principal may see on their dashboard.
///
/// Admins see everything, soft-deleted funds included. Regular users see the
/// live funds they are members of. Guests see live funds flagged
/// `guest_visible`.
pub async fn list_funds_for(
    db: &DatabaseConnection,
    viewer: &user::Model,
) -> Result<Vec<fund::Model>> {
    let query = match viewer.role() {
        Role::Admin => Fund::find(),
        Role::Guest => Fund::find()
            .filter(fund::Column::GuestVisible.eq(true))
            .filter(fund::Column::IsArchived.eq(false))
            .filter(fund::Column::IsDeleted.eq(false)),
        Role::User => Fund::find()
            .inner_join(FundMember)
            .filter(fund_member::Column::UserId.eq(viewer.id))
            .filter(fund::Column::IsArchived.eq(false))
            .filter(fund::Column::IsDeleted.eq(false)),
    };

    query
        .order_by_asc(fund::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Dashboard statistics for one fund.
#[derive(Clone, Debug, serde::Serialize)]
pub struct FundStatistics {
    /// Number of months in the schedule
    pub months_count: u64,
    /// Number of months with an assignee
    pub assignments_count: u64,
    /// Distinct members holding at least one assignment
    pub unique_members_count: u64,
    /// Verified installment payments across the fund (admin view only)
    pub verified_payments: Option<u64>,
    /// Pending installments plus pending payout receipts (admin view only)
    pub pending_payments_count: Option<u64>,
}

/// Computes the statistics block shown on the funds dashboard.
/// Payment tallies are only computed for admin viewers.
pub async fn fund_statistics(
    db: &DatabaseConnection,
    fund_id: i64,
    include_payment_stats: bool,
) -> Result<FundStatistics> {
    let months_count = Month::find()
        .filter(month::Column::FundId.eq(fund_id))
        .count(db)
        .await?;

    let assignments = Assignment::find()
        .inner_join(Month)
        .filter(month::Column::FundId.eq(fund_id))
        .all(db)
        .await?;
    let assignments_count = assignments.len() as u64;
    let unique_members_count = assignments
        .iter()
        .map(|a| a.user_id)
        .collect::<HashSet<_>>()
        .len() as u64;

    let (verified_payments, pending_payments_count) = if include_payment_stats {
        let verified = InstallmentPayment::find()
            .inner_join(Month)
            .filter(month::Column::FundId.eq(fund_id))
            .filter(installment_payment::Column::Status.eq(PaymentStatus::Verified.as_str()))
            .count(db)
            .await?;

        let pending_installments = InstallmentPayment::find()
            .inner_join(Month)
            .filter(month::Column::FundId.eq(fund_id))
            .filter(installment_payment::Column::Status.eq(PaymentStatus::Pending.as_str()))
            .count(db)
            .await?;

        let pending_monthly = MonthlyPayment::find()
            .inner_join(Month)
            .filter(month::Column::FundId.eq(fund_id))
            .filter(monthly_payment::Column::Status.eq(PaymentStatus::Pending.as_str()))
            .count(db)
            .await?;

        (
            Some(verified),
            Some(pending_installments + pending_monthly),
        )
    } else {
        (None, None)
    };

    Ok(FundStatistics {
        months_count,
        assignments_count,
        unique_members_count,
        verified_payments,
        pending_payments_count,
    })
}

/// Updates a fund's name and/or description. `None` leaves a field alone.
pub async fn update_fund(
    db: &DatabaseConnection,
    fund_id: i64,
    name: Option<String>,
    description: Option<String>,
) -> Result<fund::Model> {
    let found = get_fund_by_id(db, fund_id)
        .await?
        .ok_or(Error::FundNotFound { id: fund_id })?;

    let mut active: fund::ActiveModel = found.into();
    if let Some(name) = name {
        if name.trim().is_empty() {
            return Err(Error::validation("Fund name cannot be empty"));
        }
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = description {
        active.description = Set(description);
    }
    active.update(db).await.map_err(Into::into)
}

/// Sets or clears the archived flag.
pub async fn set_archived(
    db: &DatabaseConnection,
    fund_id: i64,
    archived: bool,
) -> Result<fund::Model> {
    let found = get_fund_by_id(db, fund_id)
        .await?
        .ok_or(Error::FundNotFound { id: fund_id })?;

    let mut active: fund::ActiveModel = found.into();
    active.is_archived = Set(archived);
    active.update(db).await.map_err(Into::into)
}

/// Soft-deletes a fund. Data stays in place; only admins will see it.
pub async fn soft_delete_fund(db: &DatabaseConnection, fund_id: i64) -> Result<fund::Model> {
    let found = get_fund_by_id(db, fund_id)
        .await?
        .ok_or(Error::FundNotFound { id: fund_id })?;

    let mut active: fund::ActiveModel = found.into();
    active.is_deleted = Set(true);
    active.update(db).await.map_err(Into::into)
}

/// Opts a fund in or out of guest viewing.
pub async fn set_guest_visible(
    db: &DatabaseConnection,
    fund_id: i64,
    visible: bool,
) -> Result<fund::Model> {
    let found = get_fund_by_id(db, fund_id)
        .await?
        .ok_or(Error::FundNotFound { id: fund_id })?;

    let mut active: fund::ActiveModel = found.into();
    active.guest_visible = Set(visible);
    active.update(db).await.map_err(Into::into)
}

/// Adds a user to a fund's member set if absent.
/// Returns true when a membership row was actually created.
pub async fn add_member<C>(db: &C, fund_id: i64, user_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    let existing = FundMember::find()
        .filter(fund_member::Column::FundId.eq(fund_id))
        .filter(fund_member::Column::UserId.eq(user_id))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(false);
    }

    fund_member::ActiveModel {
        fund_id: Set(fund_id),
        user_id: Set(user_id),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(true)
}

/// A regular user joins a fund themselves.
///
/// Guests can never join; admins don't need to. Joining twice is a no-op,
/// matching [`add_member`]. The fund must be live for the joiner.
pub async fn join_fund(
    db: &DatabaseConnection,
    fund_id: i64,
    joiner: &user::Model,
) -> Result<bool> {
    let fund = get_fund_by_id(db, fund_id)
        .await?
        .ok_or(Error::FundNotFound { id: fund_id })?;

    match joiner.role() {
        Role::Guest => Err(Error::access_denied("Guests cannot join funds")),
        Role::Admin => Ok(false),
        Role::User => {
            if fund.is_deleted {
                return Err(Error::FundNotFound { id: fund_id });
            }
            if fund.is_archived {
                return Err(Error::access_denied("This fund is archived"));
            }
            add_member(db, fund_id, joiner.id).await
        }
    }
}

/// All members of a fund, ordered by username.
pub async fn list_members(db: &DatabaseConnection, fund_id: i64) -> Result<Vec<user::Model>> {
    User::find()
        .inner_join(FundMember)
        .filter(fund_member::Column::FundId.eq(fund_id))
        .order_by_asc(user::Column::Username)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::{assignment, month as months, payment};
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_fund_with_months() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db).await?;

        let created = create_fund(
            &db,
            "Family 2026".to_string(),
            "Ten month pool".to_string(),
            10000.0,
            vec![
                NewMonth {
                    month_name: "Jan".to_string(),
                    installment_amount: 100.0,
                    payment_amount: 1000.0,
                },
                NewMonth {
                    month_name: "Feb".to_string(),
                    installment_amount: 100.0,
                    payment_amount: 1000.0,
                },
            ],
            &admin,
        )
        .await?;

        assert_eq!(created.number_of_months, 2);
        assert!(!created.guest_visible);

        let schedule = months::list_months(&db, created.id).await?;
        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule[0].month_number, 1);
        assert_eq!(schedule[1].month_number, 2);

        // Creator became a member
        assert!(crate::core::access::is_member(&db, created.id, admin.id).await?);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_fund_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db).await?;

        let no_months = create_fund(
            &db,
            "Empty".to_string(),
            String::new(),
            0.0,
            vec![],
            &admin,
        )
        .await;
        assert!(matches!(no_months.unwrap_err(), Error::Validation { .. }));

        let bad_amount = create_fund(
            &db,
            "Bad".to_string(),
            String::new(),
            100.0,
            vec![NewMonth {
                month_name: "Jan".to_string(),
                installment_amount: -5.0,
                payment_amount: 0.0,
            }],
            &admin,
        )
        .await;
        assert!(bad_amount.is_err());

        Ok(())
    }

    #[tokio::test]
    async fn test_list_funds_per_role() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db).await?;
        let alice = create_test_user(&db, "alice").await?;
        let guest = create_test_guest(&db).await?;

        let family = create_test_fund(&db, "Family", &admin).await?;
        let office = create_test_fund(&db, "Office", &admin).await?;
        add_member(&db, family.id, alice.id).await?;
        set_guest_visible(&db, office.id, true).await?;

        // Admin sees both
        assert_eq!(list_funds_for(&db, &admin).await?.len(), 2);

        // Alice sees only the fund she belongs to
        let for_alice = list_funds_for(&db, &alice).await?;
        assert_eq!(for_alice.len(), 1);
        assert_eq!(for_alice[0].id, family.id);

        // Guest sees only the guest-visible fund
        let for_guest = list_funds_for(&db, &guest).await?;
        assert_eq!(for_guest.len(), 1);
        assert_eq!(for_guest[0].id, office.id);

        // Archiving hides from members but not from admins
        set_archived(&db, family.id, true).await?;
        assert!(list_funds_for(&db, &alice).await?.is_empty());
        assert_eq!(list_funds_for(&db, &admin).await?.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_join_fund_rules() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db).await?;
        let alice = create_test_user(&db, "alice").await?;
        let guest = create_test_guest(&db).await?;
        let fund_row = create_test_fund(&db, "Family", &admin).await?;

        assert!(join_fund(&db, fund_row.id, &alice).await?);
        // Second join is a no-op
        assert!(!join_fund(&db, fund_row.id, &alice).await?);

        let guest_join = join_fund(&db, fund_row.id, &guest).await;
        assert!(matches!(
            guest_join.unwrap_err(),
            Error::AccessDenied { .. }
        ));

        set_archived(&db, fund_row.id, true).await?;
        let bob = create_test_user(&db, "bob").await?;
        assert!(join_fund(&db, fund_row.id, &bob).await.is_err());

        Ok(())
    }

    #[tokio::test]
    async fn test_fund_statistics() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db).await?;
        let alice = create_test_user(&db, "alice").await?;
        let fund_row = create_test_fund(&db, "Family", &admin).await?;
        let schedule = months::list_months(&db, fund_row.id).await?;

        assignment::assign_user_to_month(&db, schedule[0].id, alice.id, &admin).await?;
        payment::mark_installment(
            &db,
            schedule[0].id,
            &alice,
            payment::PaymentDetails::default(),
        )
        .await?;

        let stats = fund_statistics(&db, fund_row.id, true).await?;
        assert_eq!(stats.months_count, 2);
        assert_eq!(stats.assignments_count, 1);
        assert_eq!(stats.unique_members_count, 1);
        assert_eq!(stats.verified_payments, Some(0));
        assert_eq!(stats.pending_payments_count, Some(1));

        let member_stats = fund_statistics(&db, fund_row.id, false).await?;
        assert!(member_stats.verified_payments.is_none());

        Ok(())
    }
}
