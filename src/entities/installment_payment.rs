//! Installment payment entity - A member's monthly contribution record.
//!
//! Lifecycle is driven by `status`: `"pending"` when marked by the member,
//! `"verified"` or `"rejected"` once an admin reviews it. A rejected row is
//! reused on resubmission (status returns to pending with fresh details).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Installment payment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "installment_payments")]
pub struct Model {
    /// Unique identifier for the payment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Member the installment belongs to
    pub user_id: i64,
    /// Month the installment is for
    pub month_id: i64,
    /// When the payment row was marked (or last resubmitted)
    pub paid_at: DateTimeUtc,
    /// Member-supplied date the money actually moved, if provided
    pub payment_date: Option<DateTimeUtc>,
    /// External transaction reference (bank/UPI id), if provided
    pub transaction_id: Option<String>,
    /// How the money moved (e.g. `"cash"`, `"transfer"`), if provided
    pub transaction_type: Option<String>,
    /// User who marked the payment (the member, or an admin on their behalf)
    pub marked_by: i64,
    /// Admin who verified or rejected the payment
    pub verified_by: Option<i64>,
    /// Lifecycle state: `"pending"`, `"verified"`, or `"rejected"`
    pub status: String,
}

/// Defines relationships between `InstallmentPayment` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each payment belongs to one member
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// Each payment belongs to one month
    #[sea_orm(
        belongs_to = "super::month::Entity",
        from = "Column::MonthId",
        to = "super::month::Column::Id"
    )]
    Month,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::month::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Month.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
