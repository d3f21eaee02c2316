//! Fund entity - Represents one rotating savings pool.
//!
//! A fund owns a schedule of months and a member set. The three flags drive
//! the access rules: `is_archived` and `is_deleted` block non-admin access,
//! `guest_visible` opts the fund into read-only guest viewing.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Fund database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "funds")]
pub struct Model {
    /// Unique identifier for the fund
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable fund name
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Total pooled amount over the fund's lifetime, in currency units
    pub total_amount: f64,
    /// Number of months in the schedule
    pub number_of_months: i32,
    /// User id of the admin who created the fund
    pub created_by: i64,
    /// When the fund was created
    pub created_at: DateTimeUtc,
    /// Archived funds are read-blocked for non-admins but keep their data
    pub is_archived: bool,
    /// Soft delete flag - hidden from everyone except admins
    pub is_deleted: bool,
    /// Whether guest accounts may view this fund
    pub guest_visible: bool,
}

/// Defines relationships between Fund and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One fund has many months
    #[sea_orm(has_many = "super::month::Entity")]
    Months,
    /// One fund has many membership rows
    #[sea_orm(has_many = "super::fund_member::Entity")]
    FundMembers,
}

impl Related<super::month::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Months.def()
    }
}

impl Related<super::fund_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FundMembers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
