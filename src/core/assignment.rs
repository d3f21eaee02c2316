//! Month assignment business logic.
//!
//! A month has at most one assignee. Assigning replaces any prior assignee
//! by updating the single assignment row in place, and always leaves the
//! assignee a member of the fund. Both writes happen in one transaction.

use crate::{
    core::access::HasRole,
    entities::{Assignment, Month, User, assignment, month, user},
    errors::{Error, Result},
};
use sea_orm::{Set, TransactionTrait, prelude::*};

/// Assigns a user to a month, replacing any existing assignee.
///
/// The assignee is implicitly added to the fund's member set. Guests cannot
/// hold assignments.
pub async fn assign_user_to_month(
    db: &DatabaseConnection,
    month_id: i64,
    user_id: i64,
    assigned_by: &user::Model,
) -> Result<assignment::Model> {
    let month = Month::find_by_id(month_id)
        .one(db)
        .await?
        .ok_or(Error::MonthNotFound { id: month_id })?;

    let assignee = User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            user: user_id.to_string(),
        })?;
    if assignee.role() == crate::core::access::Role::Guest {
        return Err(Error::validation("Guests cannot be assigned to a month"));
    }

    let txn = db.begin().await?;
    let now = chrono::Utc::now();

    let existing = Assignment::find()
        .filter(assignment::Column::MonthId.eq(month_id))
        .one(&txn)
        .await?;

    let saved = if let Some(current) = existing {
        // Replace the assignee in place - the month keeps a single row
        let mut active: assignment::ActiveModel = current.into();
        active.user_id = Set(user_id);
        active.assigned_by = Set(assigned_by.id);
        active.assigned_at = Set(now);
        active.update(&txn).await?
    } else {
        assignment::ActiveModel {
            user_id: Set(user_id),
            month_id: Set(month_id),
            assigned_at: Set(now),
            assigned_by: Set(assigned_by.id),
            ..Default::default()
        }
        .insert(&txn)
        .await?
    };

    // Assignment implies fund membership
    crate::core::fund::add_member(&txn, month.fund_id, user_id).await?;

    txn.commit().await?;
    Ok(saved)
}

/// Removes a month's assignment. Returns false when none existed.
pub async fn unassign_month(db: &DatabaseConnection, month_id: i64) -> Result<bool> {
    let result = Assignment::delete_many()
        .filter(assignment::Column::MonthId.eq(month_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// The assignment row for a month, if any.
pub async fn get_assignment_for_month(
    db: &DatabaseConnection,
    month_id: i64,
) -> Result<Option<assignment::Model>> {
    Assignment::find()
        .filter(assignment::Column::MonthId.eq(month_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// All assignments a user holds, in a given fund.
pub async fn get_assignments_for_user_in_fund(
    db: &DatabaseConnection,
    user_id: i64,
    fund_id: i64,
) -> Result<Vec<assignment::Model>> {
    Assignment::find()
        .inner_join(Month)
        .filter(assignment::Column::UserId.eq(user_id))
        .filter(month::Column::FundId.eq(fund_id))
        .all(db)
        .await
        .map_err(Into::into)
}
