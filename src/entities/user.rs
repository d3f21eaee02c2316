//! User entity - Represents an account in the system.
//!
//! Each user has a unique username, a password digest, a role string
//! (`"admin"`, `"user"`, or `"guest"`), and the customer-facing identity
//! fields (`customer_id`, `alias`) used when privacy rules hide real names.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Unique login name
    #[sea_orm(unique)]
    pub username: String,
    /// Salted password digest, never exposed over the API
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Real name, visible only to admins and the user themself
    pub full_name: String,
    /// Role string: `"admin"`, `"user"`, or `"guest"`
    pub role: String,
    /// Customer-facing identifier (e.g. `"C007"`, `"GUEST"`)
    pub customer_id: Option<String>,
    /// Optional public nickname shown to other members instead of the name
    pub alias: Option<String>,
    /// When the account was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user holds many fund memberships
    #[sea_orm(has_many = "super::fund_member::Entity")]
    FundMembers,
    /// One user has many month assignments (across funds)
    #[sea_orm(has_many = "super::assignment::Entity")]
    Assignments,
    /// One user has many installment payments
    #[sea_orm(has_many = "super::installment_payment::Entity")]
    InstallmentPayments,
    /// One user has many login sessions
    #[sea_orm(has_many = "super::session::Entity")]
    Sessions,
}

impl Related<super::fund_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FundMembers.def()
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

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
