//! Derived time metrics for an activity.
//!
//! Everything here is a pure function of the activity's timestamps, its
//! status, and a caller-supplied `now`. Nothing is cached.

use chrono::{DateTime, TimeDelta, Utc};

use crate::clock::Clock;
use crate::model::{Activity, ActivityStatus, Outcome};
use crate::outcome::classify;

/// Formats a non-negative span with the largest whole unit that fits:
/// minutes below one hour, hours below one day, days otherwise.
///
/// Negative spans are treated as zero.
#[must_use]
pub fn format_span(span: TimeDelta) -> String {
    let span = span.max(TimeDelta::zero());
    if span < TimeDelta::hours(1) {
        format!("{}m", span.num_minutes())
    } else if span < TimeDelta::days(1) {
        format!("{}h", span.num_hours())
    } else {
        format!("{}d", span.num_days())
    }
}

/// Time metrics for one activity evaluated at one instant.
#[derive(Debug, Clone, Copy)]
pub struct ActivityTiming<'a> {
    activity: &'a Activity,
    now: DateTime<Utc>,
}

impl<'a> ActivityTiming<'a> {
    /// Evaluates `activity` at `now`.
    #[must_use]
    pub const fn new(activity: &'a Activity, now: DateTime<Utc>) -> Self {
        Self { activity, now }
    }

    /// Evaluates `activity` at the clock's current instant.
    #[must_use]
    pub fn at(activity: &'a Activity, clock: &dyn Clock) -> Self {
        Self::new(activity, clock.now())
    }

    /// Returns the evaluation instant.
    #[must_use]
    pub const fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// The deadline has passed and the activity is not finished.
    #[must_use]
    pub fn is_overdue(&self) -> bool {
        self.activity.deadline() < self.now && !self.activity.is_terminal()
    }

    /// Human-readable remaining time, e.g. `"3h left"` or `"Overdue by 2d"`.
    ///
    /// Finished activities whose deadline has passed report `"0m left"`.
    #[must_use]
    pub fn time_remaining(&self) -> String {
        let deadline = self.activity.deadline();
        if self.is_overdue() {
            format!("Overdue by {}", format_span(self.now - deadline))
        } else {
            format!("{} left", format_span(deadline - self.now))
        }
    }

    /// Where progress is measured from: the start of work if known,
    /// otherwise the creation instant.
    #[must_use]
    pub fn progress_start_date(&self) -> DateTime<Utc> {
        self.activity
            .started_at()
            .unwrap_or_else(|| self.activity.created_at())
    }

    /// Fraction of the start-to-deadline window that has elapsed, in
    /// `[0, 1]`.
    ///
    /// A window of zero or negative length counts as fully elapsed.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn time_progress(&self) -> f64 {
        let start = self.progress_start_date();
        let total = (self.activity.deadline() - start).num_milliseconds();
        if total <= 0 {
            return 1.0;
        }
        let elapsed = (self.now - start).num_milliseconds();
        (elapsed as f64 / total as f64).clamp(0.0, 1.0)
    }

    /// Complement of [`Self::time_progress`], floored at zero.
    #[must_use]
    pub fn time_remaining_progress(&self) -> f64 {
        (1.0 - self.time_progress()).max(0.0)
    }

    /// `deadline - completed_at`: positive when finished early, negative
    /// when late.
    ///
    /// Present only while a completion is pending approval or final. A
    /// rejected request leaves a stale `completed_at` on a running activity,
    /// which is ignored here.
    #[must_use]
    pub fn completion_delta(&self) -> Option<TimeDelta> {
        match self.activity.status() {
            ActivityStatus::ManagerPending | ActivityStatus::Completed => self
                .activity
                .completed_at()
                .map(|completed| self.activity.deadline() - completed),
            _ => None,
        }
    }

    /// Time spent in the current status.
    ///
    /// - `TeamMemberPending`: since creation.
    /// - `Running` / `ManagerPending`: since work started (creation if the
    ///   start was never stamped).
    /// - Terminal: from start to completion when both are known, else since
    ///   the start, else zero.
    #[must_use]
    pub fn current_status_duration(&self) -> TimeDelta {
        let activity = self.activity;
        let span = match activity.status() {
            ActivityStatus::TeamMemberPending => self.now - activity.created_at(),
            ActivityStatus::Running | ActivityStatus::ManagerPending => {
                self.now - self.progress_start_date()
            },
            ActivityStatus::Completed | ActivityStatus::Canceled => {
                match (activity.started_at(), activity.completed_at()) {
                    (Some(started), Some(completed)) => completed - started,
                    (Some(started), None) => self.now - started,
                    (None, _) => TimeDelta::zero(),
                }
            },
        };
        span.max(TimeDelta::zero())
    }

    /// The outcome the activity would get if it were completed at `now`.
    #[must_use]
    pub fn projected_outcome(&self) -> Outcome {
        classify(self.activity.deadline(), self.now)
    }
}
