//! Assignment entity - Which member receives a month's payout.
//!
//! The `month_id` column is unique: a month has at most one assignee.
//! Reassignment updates the existing row in place rather than inserting.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User-month assignment database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_month_assignments")]
pub struct Model {
    /// Unique identifier for the assignment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// The assigned member
    pub user_id: i64,
    /// The month being assigned; unique, one assignee per month
    #[sea_orm(unique)]
    pub month_id: i64,
    /// When the assignment was made or last changed
    pub assigned_at: DateTimeUtc,
    /// Admin who made the assignment
    pub assigned_by: i64,
}

/// Defines relationships between Assignment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each assignment points at one member
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// Each assignment belongs to one month
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
