//! Monthly payout receipt entity - Confirms the assignee received the pot.
//!
//! One row per month (`month_id` unique). Shares the pending/verified/
//! rejected lifecycle with installment payments, including rejected-row
//! reuse on resubmission.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Monthly payout receipt database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "monthly_payments_received")]
pub struct Model {
    /// Unique identifier for the receipt
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Month the payout belongs to; unique, one receipt per month
    #[sea_orm(unique)]
    pub month_id: i64,
    /// Member who received the payout (the month's assignee)
    pub user_id: i64,
    /// When receipt was marked (or last resubmitted)
    pub received_at: DateTimeUtc,
    /// Amount actually received
    pub amount: f64,
    /// User who marked the receipt
    pub marked_by: i64,
    /// Admin who verified or rejected the receipt
    pub verified_by: Option<i64>,
    /// Lifecycle state: `"pending"`, `"verified"`, or `"rejected"`
    pub status: String,
}

/// Defines relationships between `MonthlyPayment` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each receipt belongs to one month
    #[sea_orm(
        belongs_to = "super::month::Entity",
        from = "Column::MonthId",
        to = "super::month::Column::Id"
    )]
    Month,
    /// Each receipt belongs to one member
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::month::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Month.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
