//! The activity record and its enumerations.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::member::MemberId;

/// Unique identifier for an activity.
pub type ActivityId = Uuid;

/// Urgency level of an activity.
///
/// Four ordered levels; a lower level is more urgent, so `P1 < P4` under
/// the derived ordering. [`Priority::P4`] is the default and the fallback
/// for unrecognized wire tokens.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum Priority {
    /// Most urgent.
    P1,
    /// High.
    P2,
    /// Normal.
    P3,
    /// Least urgent.
    #[default]
    P4,
}

impl Priority {
    /// All levels, most urgent first.
    pub const ALL: [Self; 4] = [Self::P1, Self::P2, Self::P3, Self::P4];

    /// Returns the numeric level (1 is most urgent).
    #[must_use]
    pub const fn level(self) -> u8 {
        match self {
            Self::P1 => 1,
            Self::P2 => 2,
            Self::P3 => 3,
            Self::P4 => 4,
        }
    }

    /// Returns the short wire token.
    #[must_use]
    pub const fn as_token(self) -> &'static str {
        match self {
            Self::P1 => "P1",
            Self::P2 => "P2",
            Self::P3 => "P3",
            Self::P4 => "P4",
        }
    }

    /// Parses a wire token, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.as_token().eq_ignore_ascii_case(token))
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

/// Lifecycle stage of an activity.
///
/// ```text
/// TeamMemberPending --start--> Running --request--> ManagerPending --approve--> Completed
///        |                      |  ^                      |
///        |                      |  +-------reject---------+
///        +------cancel------+   |
///                           v   v
///                          Canceled
/// ```
///
/// `Completed` and `Canceled` are terminal. Direct completion is allowed
/// from any non-terminal status and is not drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ActivityStatus {
    /// Created and waiting for the assignee to start it.
    #[default]
    TeamMemberPending,
    /// Being worked on.
    Running,
    /// Completion requested, waiting for the manager's decision.
    ManagerPending,
    /// Finished and approved (terminal).
    Completed,
    /// Abandoned before completion (terminal).
    Canceled,
}

impl ActivityStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::TeamMemberPending,
        Self::Running,
        Self::ManagerPending,
        Self::Completed,
        Self::Canceled,
    ];

    /// Returns the display label used on the wire.
    #[must_use]
    pub const fn as_label(self) -> &'static str {
        match self {
            Self::TeamMemberPending => "Team Member Pending",
            Self::Running => "Running",
            Self::ManagerPending => "Manager Pending",
            Self::Completed => "Completed",
            Self::Canceled => "Canceled",
        }
    }

    /// Parses an exact display label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_label() == label)
    }

    /// Returns `true` for `Completed` and `Canceled`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Canceled)
    }

    /// Returns `true` if an activity in this status carries no outcome.
    #[must_use]
    pub const fn forbids_outcome(self) -> bool {
        matches!(self, Self::TeamMemberPending | Self::Running)
    }
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Deadline-relative classification of a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Finished at least thirty minutes before the deadline.
    Ahead,
    /// Finished close to the deadline.
    JustInTime,
    /// Finished more than five minutes after the deadline.
    Overrun,
}

impl Outcome {
    /// All outcomes.
    pub const ALL: [Self; 3] = [Self::Ahead, Self::JustInTime, Self::Overrun];

    /// Returns the display label used on the wire.
    #[must_use]
    pub const fn as_label(self) -> &'static str {
        match self {
            Self::Ahead => "Ahead",
            Self::JustInTime => "Just In Time",
            Self::Overrun => "Overrun",
        }
    }

    /// Parses an exact display label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.as_label() == label)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// A time-boxed unit of work moving through the approval workflow.
///
/// Status, outcome and the lifecycle timestamps are only changed through the
/// transition methods in [`crate::lifecycle`]; the getters here are
/// read-only.
///
/// # Timestamp Precision
///
/// The record format stores whole seconds. Sub-second parts of any
/// timestamp are lost on an encode/decode cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub(crate) id: ActivityId,
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) priority: Priority,
    pub(crate) assigned_member: MemberId,
    pub(crate) manager_email: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) deadline: DateTime<Utc>,
    pub(crate) started_at: Option<DateTime<Utc>>,
    pub(crate) completed_at: Option<DateTime<Utc>>,
    pub(crate) status: ActivityStatus,
    pub(crate) outcome: Option<Outcome>,
}

impl Activity {
    /// Creates a pending activity stamped with the current system time.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        assigned_member: MemberId,
        deadline: DateTime<Utc>,
    ) -> Self {
        Self::new_with_timestamp(name, assigned_member, deadline, Utc::now())
    }

    /// Creates a pending activity with an explicit creation instant.
    ///
    /// This is useful for testing and for clients driving an injected
    /// [`Clock`](crate::clock::Clock).
    #[must_use]
    pub fn new_with_timestamp(
        name: impl Into<String>,
        assigned_member: MemberId,
        deadline: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            priority: Priority::default(),
            assigned_member,
            manager_email: None,
            created_at,
            deadline,
            started_at: None,
            completed_at: None,
            status: ActivityStatus::TeamMemberPending,
            outcome: None,
        }
    }

    /// Replaces the generated id.
    #[must_use]
    pub const fn with_id(mut self, id: ActivityId) -> Self {
        self.id = id;
        self
    }

    /// Sets the free-text description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the manager email used for approval routing.
    ///
    /// Surrounding whitespace is trimmed and a blank email clears it.
    #[must_use]
    pub fn with_manager_email(mut self, email: impl Into<String>) -> Self {
        self.manager_email = super::normalize_email(&email.into());
        self
    }

    /// Returns the activity id.
    #[must_use]
    pub const fn id(&self) -> ActivityId {
        self.id
    }

    /// Returns the activity name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the id of the assigned team member.
    #[must_use]
    pub const fn assigned_member(&self) -> MemberId {
        self.assigned_member
    }

    /// Returns the manager email, if any.
    #[must_use]
    pub fn manager_email(&self) -> Option<&str> {
        self.manager_email.as_deref()
    }

    /// Returns when the activity was created.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the deadline.
    #[must_use]
    pub const fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    /// Returns when work started, if it has.
    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Returns the completion instant.
    ///
    /// While the status is `ManagerPending` this is the provisional instant
    /// at which completion was requested; once `Completed` it is the
    /// approval instant. A rejected request leaves the provisional value in
    /// place.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> ActivityStatus {
        self.status
    }

    /// Returns the outcome, if a completion was requested or finalized.
    #[must_use]
    pub const fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Returns `true` if the activity is in a terminal status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
