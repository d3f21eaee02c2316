//! Session entity - Opaque login tokens with an expiry.
//!
//! Tokens are random v4 uuids; there is no cryptographic structure to them.
//! Expired rows are treated as absent by the lookup path.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Session database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    /// Unique identifier for the session row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Opaque bearer token handed to the client
    #[sea_orm(unique)]
    pub token: String,
    /// User the session belongs to
    pub user_id: i64,
    /// When the session was created
    pub created_at: DateTimeUtc,
    /// When the session stops being accepted
    pub expires_at: DateTimeUtc,
}

/// Defines relationships between Session and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each session belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
