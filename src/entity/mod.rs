//! Database entity models.
//!
//! Every table the application persists is described here as a Sea-ORM
//! entity. Besides the generated `Model`/`ActiveModel` pair, each domain
//! entity implements [`RowSchema`](crate::repository::RowSchema) so the generic
//! [`Repository`](crate::repository::Repository) knows which columns carry the
//! stable identifier and the update and soft-delete timestamps.

/// Portfolio contact messages left by visitors.
pub mod contact_message;
/// GitHub account linked to a profile.
pub mod github_profile;
/// LinkedIn account linked to a profile.
pub mod linkedin_profile;
/// Public portfolio profiles.
pub mod profile;
/// Persisted `tower-sessions` records.
pub mod session;
/// Skills shown on the portfolio.
pub mod skill;
/// Accounts that can sign in.
pub mod user;

use sea_orm::prelude::DateTimeWithTimeZone;

/// Current time in the representation stored by timestamp columns.
pub(crate) fn now() -> DateTimeWithTimeZone {
    chrono::Utc::now().fixed_offset()
}
