//! Teams: a named roster plus the activities assigned within it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::activity::Activity;
use super::member::{MemberId, TeamMember};

/// Errors raised when editing a team's collections.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TeamError {
    /// The activity is assigned to someone outside this team.
    #[error("member {member_id} is not on team {team}")]
    UnknownMember {
        /// The team that rejected the activity.
        team: String,
        /// The assignee that was not found.
        member_id: MemberId,
    },

    /// A member with the same name already exists on the team.
    #[error("team {team} already has a member named {name}")]
    DuplicateMember {
        /// The team name.
        team: String,
        /// The duplicated member name.
        name: String,
    },
}

/// A named collection of members and the activities they own.
///
/// The team owns its activities outright; an activity lives in exactly one
/// team's collection. Referential integrity between `activities` and
/// `members` is only checked by [`Team::add_activity`]; decoded data and
/// lifecycle transitions rely on callers keeping it intact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    name: String,
    manager_email: Option<String>,
    members: Vec<TeamMember>,
    activities: Vec<Activity>,
}

impl Team {
    /// Creates an empty team.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            manager_email: None,
            members: Vec::new(),
            activities: Vec::new(),
        }
    }

    /// Sets the team's manager email.
    #[must_use]
    pub fn with_manager_email(mut self, email: impl Into<String>) -> Self {
        self.manager_email = super::normalize_email(&email.into());
        self
    }

    /// Returns the team name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the manager email, if any.
    #[must_use]
    pub fn manager_email(&self) -> Option<&str> {
        self.manager_email.as_deref()
    }

    /// Returns the members.
    #[must_use]
    pub fn members(&self) -> &[TeamMember] {
        &self.members
    }

    /// Returns the activities.
    #[must_use]
    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    /// Returns the activities for in-place mutation.
    pub fn activities_mut(&mut self) -> &mut [Activity] {
        &mut self.activities
    }

    /// Looks up a member by id.
    #[must_use]
    pub fn member(&self, id: MemberId) -> Option<&TeamMember> {
        self.members.iter().find(|m| m.id() == id)
    }

    /// Returns `true` if `id` belongs to this team.
    #[must_use]
    pub fn has_member(&self, id: MemberId) -> bool {
        self.member(id).is_some()
    }

    /// Adds a member.
    ///
    /// # Errors
    ///
    /// Returns [`TeamError::DuplicateMember`] if the name is already taken;
    /// activity rows reference members by name.
    pub fn add_member(&mut self, member: TeamMember) -> Result<(), TeamError> {
        if self.members.iter().any(|m| m.name() == member.name()) {
            return Err(TeamError::DuplicateMember {
                team: self.name.clone(),
                name: member.name().to_string(),
            });
        }
        self.members.push(member);
        Ok(())
    }

    /// Adds an activity assigned to one of this team's members.
    ///
    /// # Errors
    ///
    /// Returns [`TeamError::UnknownMember`] if the assignee is not on the
    /// team.
    pub fn add_activity(&mut self, activity: Activity) -> Result<(), TeamError> {
        if !self.has_member(activity.assigned_member()) {
            return Err(TeamError::UnknownMember {
                team: self.name.clone(),
                member_id: activity.assigned_member(),
            });
        }
        self.activities.push(activity);
        Ok(())
    }

    /// Removes every activity matching `predicate`, returning how many were
    /// removed.
    pub fn remove_activities<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&Activity) -> bool,
    {
        let before = self.activities.len();
        self.activities.retain(|a| !predicate(a));
        before - self.activities.len()
    }

    pub(crate) fn push_member_unchecked(&mut self, member: TeamMember) {
        self.members.push(member);
    }

    pub(crate) fn push_activity_unchecked(&mut self, activity: Activity) {
        self.activities.push(activity);
    }

    pub(crate) fn set_manager_email_if_absent(&mut self, email: Option<String>) {
        if self.manager_email.is_none() {
            self.manager_email = email.as_deref().and_then(super::normalize_email);
        }
    }
}
