//! Data model: team members, teams, activities and the client-side tree
//! that holds them.

mod activity;
mod member;
mod team;
mod workspace;

pub use activity::{Activity, ActivityId, ActivityStatus, Outcome, Priority};
pub use member::{MemberId, TeamMember};
pub use team::{Team, TeamError};
pub use workspace::{RosterEntry, Workspace};

/// Trims an email address; blank reads as absent. Matches how the codec
/// reads email columns back.
pub(crate) fn normalize_email(email: &str) -> Option<String> {
    let email = email.trim();
    (!email.is_empty()).then(|| email.to_string())
}
