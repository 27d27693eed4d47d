//! Lifecycle error types.

use thiserror::Error;

use crate::model::{ActivityId, ActivityStatus};

/// Why a lifecycle operation declined to mutate anything.
///
/// Both variants are ordinary "absent result" outcomes rather than faults:
/// the activity tree is left exactly as it was. Callers that do not care
/// about the distinction can use `.ok()`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LifecycleError {
    /// No activity with this id exists.
    #[error("activity not found: {activity_id}")]
    ActivityNotFound {
        /// The id that was looked up.
        activity_id: ActivityId,
    },

    /// The operation is not permitted from the activity's current status.
    #[error("cannot {transition} activity {activity_id} from status {from}")]
    IllegalTransition {
        /// The activity the operation targeted.
        activity_id: ActivityId,
        /// The status the activity was in.
        from: ActivityStatus,
        /// The operation name.
        transition: &'static str,
    },
}

impl LifecycleError {
    /// Returns `true` for [`LifecycleError::ActivityNotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ActivityNotFound { .. })
    }

    /// Returns `true` for [`LifecycleError::IllegalTransition`].
    #[must_use]
    pub const fn is_illegal_transition(&self) -> bool {
        matches!(self, Self::IllegalTransition { .. })
    }
}
