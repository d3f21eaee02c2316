//! Core business logic - framework-agnostic rules over the entities.
//!
//! Everything the HTTP layer does goes through these modules; none of them
//! know about axum. The access resolver, assignment manager, and payment
//! state machine live here.

/// Access resolution: roles, fund visibility, display-name privacy
pub mod access;
/// Month assignment with implicit fund membership
pub mod assignment;
/// Audit sink and the audit viewer query
pub mod audit;
/// Fund CRUD, membership, flags, and dashboard statistics
pub mod fund;
/// Month schedule CRUD and the per-fund overview
pub mod month;
/// Installment payment and payout receipt lifecycle
pub mod payment;
/// Login session tokens
pub mod session;
/// User accounts, credentials, and seeding
pub mod user;
