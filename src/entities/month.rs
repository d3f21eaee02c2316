//! Month entity - One installment/payout slot in a fund's schedule.
//!
//! `month_number` is unique within a fund (enforced by the core layer);
//! `installment_amount` is what every member pays that month and
//! `payment_amount` is what the assigned member receives.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Month database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "months")]
pub struct Model {
    /// Unique identifier for the month
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Fund this month belongs to
    pub fund_id: i64,
    /// Display name (e.g. `"Jan"`, `"Feb"`)
    pub month_name: String,
    /// Position in the fund schedule, starting at 1, unique per fund
    pub month_number: i32,
    /// Installment each member pays for this month
    pub installment_amount: f64,
    /// Payout the assigned member receives for this month
    pub payment_amount: f64,
    /// Calendar year of the slot
    pub year: i32,
}

/// Defines relationships between Month and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each month belongs to one fund
    #[sea_orm(
        belongs_to = "super::fund::Entity",
        from = "Column::FundId",
        to = "super::fund::Column::Id"
    )]
    Fund,
    /// A month has at most one assignment row
    #[sea_orm(has_many = "super::assignment::Entity")]
    Assignments,
    /// One month has many installment payments (one per paying member)
    #[sea_orm(has_many = "super::installment_payment::Entity")]
    InstallmentPayments,
    /// A month has at most one payout receipt row
    #[sea_orm(has_many = "super::monthly_payment::Entity")]
    MonthlyPayments,
}

impl Related<super::fund::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Fund.def()
    }
}

impl Related<super::assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignments.def()
    }
}

impl Related<super::installment_payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InstallmentPayments.def()
    }
}

impl Related<super::monthly_payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MonthlyPayments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
