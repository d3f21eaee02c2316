//! Route handlers, grouped by resource.

/// Assignment endpoints
pub mod assignments;
/// Audit viewer endpoint
pub mod audit;
/// Login, logout, and the current-user endpoint
pub mod auth;
/// Fund CRUD, flags, membership, and the dashboard
pub mod funds;
/// Month schedule endpoints
pub mod months;
/// Installment payment and payout receipt endpoints
pub mod payments;
/// User administration endpoints
pub mod users;
