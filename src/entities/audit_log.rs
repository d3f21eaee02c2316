//! Audit log entity - Append-only record of state-changing actions.
//!
//! `user_id` is nullable for anonymous actions (failed logins), `fund_id`
//! is set when the action is fund-scoped, and `details` holds a JSON blob
//! of action-specific context.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Audit log database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "audit_logs")]
pub struct Model {
    /// Unique identifier for the log entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Acting user, absent for anonymous actions
    pub user_id: Option<i64>,
    /// Machine-readable action tag (e.g. `"LOGIN"`, `"PAYMENT_VERIFIED"`)
    pub action_type: String,
    /// Human-readable description of what happened
    pub action_description: String,
    /// Client IP as reported by proxy headers or the socket
    pub ip_address: Option<String>,
    /// Client User-Agent header
    pub user_agent: Option<String>,
    /// Action-specific context serialized as JSON
    pub details: Option<String>,
    /// Fund the action concerned, if fund-scoped
    pub fund_id: Option<i64>,
    /// When the action happened
    pub created_at: DateTimeUtc,
}

/// Audit logs reference users and funds loosely; no navigable relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
