//! Team members.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a team member.
pub type MemberId = Uuid;

/// A person who can be assigned activities.
///
/// The email is the correlation key other systems use to route
/// notifications; it is carried through the codec untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamMember {
    id: MemberId,
    name: String,
    email: String,
}

impl TeamMember {
    /// Creates a member with a freshly generated id.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name, email)
    }

    /// Creates a member with an explicit id. The email is trimmed.
    #[must_use]
    pub fn with_id(id: MemberId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into().trim().to_string(),
        }
    }

    /// Derives a stable id from the team and member names.
    ///
    /// The membership format carries no id column, so decoding the same
    /// roster twice must yield the same ids for activity references to stay
    /// valid across pulls.
    #[must_use]
    pub fn derived_id(team: &str, name: &str) -> MemberId {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("{team}/{name}").as_bytes())
    }

    /// Returns the member id.
    #[must_use]
    pub const fn id(&self) -> MemberId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }
}
