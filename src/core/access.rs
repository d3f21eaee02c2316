//! Access resolution - who may see or change a fund.
//!
//! All role and membership rules live here so route handlers never reason
//! about flags themselves. Admins bypass every check. Guests get read-only
//! access to funds explicitly marked `guest_visible`. Regular users are
//! restricted to funds they are members of, and archived or soft-deleted
//! funds are blocked for them entirely. Display-name privacy rules for
//! showing one user to another also live here.

use crate::{
    entities::{Fund, FundMember, fund, fund_member},
    errors::{Error, Result},
};
use sea_orm::prelude::*;
use serde::Serialize;

/// Principal role, parsed from the stored role string.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Role {
    /// Full access to everything, including archived and deleted funds
    Admin,
    /// Regular member: sees and mutates only live funds they belong to
    User,
    /// Read-only visitor: sees only guest-visible live funds
    Guest,
}

impl Role {
    /// Parses a stored role string. Unknown strings degrade to [`Role::User`],
    /// matching how the database default behaves.
    #[must_use]
    pub fn parse(role: &str) -> Self {
        match role {
            "admin" => Self::Admin,
            "guest" => Self::Guest,
            _ => Self::User,
        }
    }

    /// The string form stored in the `users.role` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
            Self::Guest => "guest",
        }
    }

    /// Whether this role is the admin role.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// Extension helpers for reading a user's role without sprinkling string
/// comparisons around the codebase.
pub trait HasRole {
    /// The parsed role of this principal.
    fn role(&self) -> Role;
}

impl HasRole for crate::entities::UserModel {
    fn role(&self) -> Role {
        Role::parse(&self.role)
    }
}

/// Whether a principal may view the given fund.
#[must_use]
pub fn can_view_fund(role: Role, is_member: bool, fund: &fund::Model) -> bool {
    match role {
        Role::Admin => true,
        Role::Guest => fund.guest_visible && !fund.is_archived && !fund.is_deleted,
        Role::User => is_member && !fund.is_archived && !fund.is_deleted,
    }
}

/// Whether a principal may mutate state inside the given fund.
/// Guests never mutate anything, regardless of visibility.
#[must_use]
pub fn can_mutate_fund(role: Role, is_member: bool, fund: &fund::Model) -> bool {
    match role {
        Role::Admin => true,
        Role::Guest => false,
        Role::User => is_member && !fund.is_archived && !fund.is_deleted,
    }
}

/// Returns an error unless the user is an admin.
pub fn require_admin(user: &crate::entities::UserModel) -> Result<()> {
    if user.role().is_admin() {
        Ok(())
    } else {
        Err(Error::access_denied("Admin privileges required"))
    }
}

/// Checks whether a user holds a membership row in a fund.
pub async fn is_member(db: &DatabaseConnection, fund_id: i64, user_id: i64) -> Result<bool> {
    let row = FundMember::find()
        .filter(fund_member::Column::FundId.eq(fund_id))
        .filter(fund_member::Column::UserId.eq(user_id))
        .one(db)
        .await?;
    Ok(row.is_some())
}

/// Loads a fund and verifies the user may view it.
///
/// Soft-deleted funds surface as not-found for non-admins so members cannot
/// tell a deleted fund from one that never existed. Every other denial is a
/// 403-style access error.
pub async fn ensure_fund_view(
    db: &DatabaseConnection,
    user: &crate::entities::UserModel,
    fund_id: i64,
) -> Result<fund::Model> {
    let fund = Fund::find_by_id(fund_id)
        .one(db)
        .await?
        .ok_or(Error::FundNotFound { id: fund_id })?;

    let role = user.role();
    if fund.is_deleted && !role.is_admin() {
        return Err(Error::FundNotFound { id: fund_id });
    }

    let member = is_member(db, fund_id, user.id).await?;
    if can_view_fund(role, member, &fund) {
        Ok(fund)
    } else {
        Err(Error::access_denied("You don't have access to this fund"))
    }
}

/// Loads a fund and verifies the user may mutate state inside it.
pub async fn ensure_fund_mutate(
    db: &DatabaseConnection,
    user: &crate::entities::UserModel,
    fund_id: i64,
) -> Result<fund::Model> {
    let fund = Fund::find_by_id(fund_id)
        .one(db)
        .await?
        .ok_or(Error::FundNotFound { id: fund_id })?;

    let role = user.role();
    if fund.is_deleted && !role.is_admin() {
        return Err(Error::FundNotFound { id: fund_id });
    }

    let member = is_member(db, fund_id, user.id).await?;
    if can_mutate_fund(role, member, &fund) {
        Ok(fund)
    } else {
        Err(Error::access_denied("You don't have access to this fund"))
    }
}

/// What one user is allowed to know about another.
#[derive(Clone, Debug, Serialize)]
pub struct UserDisplay {
    /// Name to show in lists and detail views
    pub display_name: String,
    /// Stable customer-facing identifier
    pub identifier: String,
    /// Real name, present only when the viewer may see it
    pub full_name: Option<String>,
    /// Public nickname, hidden from guests
    pub alias: Option<String>,
    /// Raw customer id
    pub customer_id: Option<String>,
}

/// The customer-facing identifier for a user, generated from the numeric id
/// when no customer id has been stored yet.
#[must_use]
pub fn identifier_for(user: &crate::entities::UserModel) -> String {
    user.customer_id
        .clone()
        .unwrap_or_else(|| format!("C{:03}", user.id))
}

/// Resolves what `viewer` may see about `target`.
///
/// Admins and the user themself see the real name; guests only ever see
/// customer identifiers; other members see the alias when set, otherwise the
/// identifier.
#[must_use]
pub fn display_info(
    target: &crate::entities::UserModel,
    viewer: &crate::entities::UserModel,
) -> UserDisplay {
    let identifier = identifier_for(target);

    match viewer.role() {
        Role::Guest => UserDisplay {
            display_name: identifier.clone(),
            identifier,
            full_name: None,
            alias: None,
            customer_id: target.customer_id.clone(),
        },
        Role::Admin => UserDisplay {
            display_name: target.full_name.clone(),
            identifier,
            full_name: Some(target.full_name.clone()),
            alias: target.alias.clone(),
            customer_id: target.customer_id.clone(),
        },
        Role::User => {
            if viewer.id == target.id {
                UserDisplay {
                    display_name: target.full_name.clone(),
                    identifier,
                    full_name: Some(target.full_name.clone()),
                    alias: target.alias.clone(),
                    customer_id: target.customer_id.clone(),
                }
            } else {
                UserDisplay {
                    display_name: target
                        .alias
                        .clone()
                        .unwrap_or_else(|| identifier.clone()),
                    identifier,
                    full_name: None,
                    alias: target.alias.clone(),
                    customer_id: target.customer_id.clone(),
                }
            }
        }
    }
}

/// Short form of [`display_info`] when only the name is needed.
#[must_use]
pub fn display_name(
    target: &crate::entities::UserModel,
    viewer: &crate::entities::UserModel,
) -> String {
    display_info(target, viewer).display_name
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::fund as funds;
    use crate::test_utils::*;

    fn sample_fund(guest_visible: bool, is_archived: bool, is_deleted: bool) -> fund::Model {
        fund::Model {
            id: 1,
            name: "Family 2026".to_string(),
            description: String::new(),
            total_amount: 10000.0,
            number_of_months: 10,
            created_by: 1,
            created_at: chrono::Utc::now(),
            is_archived,
            is_deleted,
            guest_visible,
        }
    }

    #[test]
    fn test_role_parse_round_trip() {
        assert_eq!(Role::parse("admin"), Role::Admin);
        assert_eq!(Role::parse("guest"), Role::Guest);
        assert_eq!(Role::parse("user"), Role::User);
        // Unknown strings act like regular users
        assert_eq!(Role::parse("superuser"), Role::User);
        assert_eq!(Role::parse(Role::Admin.as_str()), Role::Admin);
    }

    #[test]
    fn test_guest_never_sees_hidden_fund() {
        let hidden = sample_fund(false, false, false);
        assert!(!can_view_fund(Role::Guest, false, &hidden));
        // Membership doesn't help a guest either
        assert!(!can_view_fund(Role::Guest, true, &hidden));

        let visible = sample_fund(true, false, false);
        assert!(can_view_fund(Role::Guest, false, &visible));
    }

    #[test]
    fn test_guest_never_mutates() {
        let visible = sample_fund(true, false, false);
        assert!(!can_mutate_fund(Role::Guest, false, &visible));
        assert!(!can_mutate_fund(Role::Guest, true, &visible));
    }

    #[test]
    fn test_archived_and_deleted_block_non_admins() {
        let archived = sample_fund(true, true, false);
        let deleted = sample_fund(true, false, true);

        // Members are blocked regardless of membership
        assert!(!can_view_fund(Role::User, true, &archived));
        assert!(!can_view_fund(Role::User, true, &deleted));
        assert!(!can_mutate_fund(Role::User, true, &archived));
        assert!(!can_view_fund(Role::Guest, false, &archived));
        assert!(!can_view_fund(Role::Guest, false, &deleted));

        // Admin bypasses all flags
        assert!(can_view_fund(Role::Admin, false, &archived));
        assert!(can_view_fund(Role::Admin, false, &deleted));
        assert!(can_mutate_fund(Role::Admin, false, &deleted));
    }

    #[test]
    fn test_member_access() {
        let live = sample_fund(false, false, false);
        assert!(can_view_fund(Role::User, true, &live));
        assert!(can_mutate_fund(Role::User, true, &live));
        assert!(!can_view_fund(Role::User, false, &live));
        assert!(!can_mutate_fund(Role::User, false, &live));
    }

    #[tokio::test]
    async fn test_ensure_fund_view_integration() -> crate::errors::Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db).await?;
        let alice = create_test_user(&db, "alice").await?;
        let guest = create_test_guest(&db).await?;
        let fund_model = create_test_fund(&db, "Family 2026", &admin).await?;

        // Non-member is denied
        let denied = ensure_fund_view(&db, &alice, fund_model.id).await;
        assert!(matches!(
            denied.unwrap_err(),
            crate::errors::Error::AccessDenied { .. }
        ));

        // Member may view
        funds::add_member(&db, fund_model.id, alice.id).await?;
        ensure_fund_view(&db, &alice, fund_model.id).await?;

        // Guest is denied until the fund opts in
        let denied = ensure_fund_view(&db, &guest, fund_model.id).await;
        assert!(denied.is_err());
        funds::set_guest_visible(&db, fund_model.id, true).await?;
        ensure_fund_view(&db, &guest, fund_model.id).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_deleted_fund_hidden_from_members() -> crate::errors::Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db).await?;
        let alice = create_test_user(&db, "alice").await?;
        let fund_model = create_test_fund(&db, "Family 2026", &admin).await?;
        funds::add_member(&db, fund_model.id, alice.id).await?;

        funds::soft_delete_fund(&db, fund_model.id).await?;

        // Member sees not-found, not forbidden - deletion is not leaked
        let result = ensure_fund_view(&db, &alice, fund_model.id).await;
        assert!(matches!(
            result.unwrap_err(),
            crate::errors::Error::FundNotFound { .. }
        ));

        // Admin still sees it
        let fund_row = ensure_fund_view(&db, &admin, fund_model.id).await?;
        assert!(fund_row.is_deleted);

        Ok(())
    }

    #[tokio::test]
    async fn test_display_info_privacy() -> crate::errors::Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db).await?;
        let guest = create_test_guest(&db).await?;
        let mut alice = create_test_user(&db, "alice").await?;
        let bob = create_test_user(&db, "bob").await?;

        // Admin sees the real name
        assert_eq!(display_name(&alice, &admin), alice.full_name);

        // The user sees their own name
        assert_eq!(display_name(&alice, &alice), alice.full_name);

        // A guest only ever sees the customer identifier
        let info = display_info(&alice, &guest);
        assert_eq!(info.display_name, identifier_for(&alice));
        assert!(info.full_name.is_none());
        assert!(info.alias.is_none());

        // Another member sees the alias when present, identifier otherwise
        assert_eq!(display_name(&alice, &bob), identifier_for(&alice));
        alice.alias = Some("Al".to_string());
        assert_eq!(display_name(&alice, &bob), "Al");
        let info = display_info(&alice, &bob);
        assert!(info.full_name.is_none());

        Ok(())
    }
}
