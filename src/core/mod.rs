//! Core business logic - framework-agnostic operations on categories,
//! expenses, users and sessions, plus the dashboard aggregation.

/// Category CRUD and deletion policy
pub mod category;
/// Monthly totals and recent expenses
pub mod dashboard;
/// Owner-scoped expense CRUD
pub mod expense;
/// Database-backed login sessions
pub mod session;
/// Sign-up and credential checks
pub mod user;
/// Field-level validation helpers
pub mod validation;
