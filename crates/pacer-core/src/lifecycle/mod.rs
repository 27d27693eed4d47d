//! Activity lifecycle state machine.
//!
//! # Guard Table
//!
//! | Transition          | Allowed from                     | Effects                                         |
//! |---------------------|----------------------------------|-------------------------------------------------|
//! | `Start`             | `TeamMemberPending`              | `Running`; `started_at := now`                  |
//! | `RequestCompletion` | `Running`                        | `ManagerPending`; outcome set; `completed_at := now` (provisional) |
//! | `Approve`           | `ManagerPending`                 | `Completed`; `completed_at := now`              |
//! | `Reject`            | `ManagerPending`                 | `Running`; outcome cleared                      |
//! | `Cancel`            | `TeamMemberPending`, `Running`   | `Canceled`                                      |
//! | `CompleteDirectly`  | any non-terminal                 | `Completed`; outcome set; `completed_at := now` |
//!
//! Any other pairing is declined with
//! [`LifecycleError::IllegalTransition`] and mutates nothing.
//!
//! # Invariants
//!
//! - `started_at` is written at most once and never cleared.
//! - `completed_at` is only written when entering `ManagerPending` or
//!   `Completed`. Rejection keeps the provisional value.
//! - The outcome is absent while `TeamMemberPending` or `Running`.
//!
//! When no outcome is supplied to `RequestCompletion` or `CompleteDirectly`
//! it is computed with [`classify`] against the transition instant.

mod error;


use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use error::LifecycleError;

use crate::model::{Activity, ActivityId, ActivityStatus, Outcome, Workspace};
use crate::outcome::classify;

/// A lifecycle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transition {
    /// The assignee begins work.
    Start,
    /// The assignee asks the manager to accept the work as done.
    RequestCompletion {
        /// Outcome to record; classified from the deadline when `None`.
        outcome: Option<Outcome>,
    },
    /// The manager accepts a pending completion.
    Approve,
    /// The manager sends a pending completion back.
    Reject,
    /// The activity is abandoned.
    Cancel,
    /// The activity is completed without an approval round.
    CompleteDirectly {
        /// Outcome to record; classified from the deadline when `None`.
        outcome: Option<Outcome>,
    },
}

impl Transition {
    /// One of each operation, with computed outcomes.
    pub const ALL: [Self; 6] = [
        Self::Start,
        Self::RequestCompletion { outcome: None },
        Self::Approve,
        Self::Reject,
        Self::Cancel,
        Self::CompleteDirectly { outcome: None },
    ];

    /// Returns the operation name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::RequestCompletion { .. } => "request_completion",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Cancel => "cancel",
            Self::CompleteDirectly { .. } => "complete_directly",
        }
    }

    /// Returns the status an activity ends up in after this operation.
    #[must_use]
    pub const fn target(&self) -> ActivityStatus {
        match self {
            Self::Start | Self::Reject => ActivityStatus::Running,
            Self::RequestCompletion { .. } => ActivityStatus::ManagerPending,
            Self::Approve | Self::CompleteDirectly { .. } => ActivityStatus::Completed,
            Self::Cancel => ActivityStatus::Canceled,
        }
    }
}

impl ActivityStatus {
    /// Returns `true` if `transition` is legal from this status.
    #[must_use]
    pub const fn permits(self, transition: &Transition) -> bool {
        match transition {
            Transition::Start => matches!(self, Self::TeamMemberPending),
            Transition::RequestCompletion { .. } => matches!(self, Self::Running),
            Transition::Approve | Transition::Reject => matches!(self, Self::ManagerPending),
            Transition::Cancel => matches!(self, Self::TeamMemberPending | Self::Running),
            Transition::CompleteDirectly { .. } => !self.is_terminal(),
        }
    }
}

impl Activity {
    /// Applies `transition` at instant `now`.
    ///
    /// Returns the status the activity was in before the transition.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::IllegalTransition`] without touching the
    /// activity if the current status does not permit the operation.
    pub fn apply(
        &mut self,
        transition: Transition,
        now: DateTime<Utc>,
    ) -> Result<ActivityStatus, LifecycleError> {
        let from = self.status;
        if !from.permits(&transition) {
            return Err(LifecycleError::IllegalTransition {
                activity_id: self.id,
                from,
                transition: transition.name(),
            });
        }

        match transition {
            Transition::Start => {
                self.started_at.get_or_insert(now);
            },
            Transition::RequestCompletion { outcome } | Transition::CompleteDirectly { outcome } => {
                self.outcome = Some(outcome.unwrap_or_else(|| classify(self.deadline, now)));
                self.completed_at = Some(now);
            },
            Transition::Approve => {
                let requested_at = self.completed_at.unwrap_or(now);
                let deadline = self.deadline;
                self.outcome
                    .get_or_insert_with(|| classify(deadline, requested_at));
                self.completed_at = Some(now);
            },
            Transition::Reject => {
                self.outcome = None;
            },
            Transition::Cancel => {},
        }
        self.status = transition.target();

        debug!(
            activity_id = %self.id,
            transition = transition.name(),
            from = %from,
            to = %self.status,
            "activity transitioned"
        );
        Ok(from)
    }

    /// Moves a pending activity to `Running`, stamping `started_at`.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::IllegalTransition`] unless the activity is
    /// `TeamMemberPending`.
    pub fn start_at(&mut self, now: DateTime<Utc>) -> Result<(), LifecycleError> {
        self.apply(Transition::Start, now).map(|_| ())
    }

    /// Requests manager approval for a running activity.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::IllegalTransition`] unless the activity is
    /// `Running`.
    pub fn request_completion_at(
        &mut self,
        outcome: Option<Outcome>,
        now: DateTime<Utc>,
    ) -> Result<(), LifecycleError> {
        self.apply(Transition::RequestCompletion { outcome }, now)
            .map(|_| ())
    }

    /// Approves a pending completion.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::IllegalTransition`] unless the activity is
    /// `ManagerPending`.
    pub fn approve_at(&mut self, now: DateTime<Utc>) -> Result<(), LifecycleError> {
        self.apply(Transition::Approve, now).map(|_| ())
    }

    /// Rejects a pending completion, returning the activity to `Running`.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::IllegalTransition`] unless the activity is
    /// `ManagerPending`.
    pub fn reject_at(&mut self, now: DateTime<Utc>) -> Result<(), LifecycleError> {
        self.apply(Transition::Reject, now).map(|_| ())
    }

    /// Cancels an activity that has not reached approval.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::IllegalTransition`] unless the activity is
    /// `TeamMemberPending` or `Running`.
    pub fn cancel_at(&mut self, now: DateTime<Utc>) -> Result<(), LifecycleError> {
        self.apply(Transition::Cancel, now).map(|_| ())
    }

    /// Completes a non-terminal activity without an approval round.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::IllegalTransition`] if the activity is
    /// already terminal.
    pub fn complete_directly_at(
        &mut self,
        outcome: Option<Outcome>,
        now: DateTime<Utc>,
    ) -> Result<(), LifecycleError> {
        self.apply(Transition::CompleteDirectly { outcome }, now)
            .map(|_| ())
    }
}

impl Workspace {
    /// Applies `transition` to the activity with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::ActivityNotFound`] if no team holds the
    /// activity, or [`LifecycleError::IllegalTransition`] if its status does
    /// not permit the operation. The workspace is unchanged in both cases.
    pub fn apply(
        &mut self,
        id: ActivityId,
        transition: Transition,
        now: DateTime<Utc>,
    ) -> Result<&Activity, LifecycleError> {
        let activity = self
            .find_activity_mut(id)
            .ok_or(LifecycleError::ActivityNotFound { activity_id: id })?;
        activity.apply(transition, now)?;
        Ok(activity)
    }
}
