//! Deadline-relative outcome classification.
//!
//! With `delta = completed_at - deadline`:
//!
//! | delta                      | outcome        |
//! |----------------------------|----------------|
//! | `> +5 min`                 | `Overrun`      |
//! | `-5 min ..= +5 min`        | `JustInTime`   |
//! | `<= -30 min`               | `Ahead`        |
//! | `-30 min < delta < -5 min` | `JustInTime`   |
//!
//! The last band has no category of its own and falls back to
//! `JustInTime`. Downstream consumers rely on that mapping, so it is kept.

use chrono::{DateTime, TimeDelta, Utc};

use crate::model::Outcome;

/// Half-width of the just-in-time window around the deadline, in seconds.
pub const JUST_IN_TIME_TOLERANCE_SECS: i64 = 300;

/// How far before the deadline a completion must land to count as ahead,
/// in seconds.
pub const AHEAD_THRESHOLD_SECS: i64 = 1800;

/// Classifies a completion instant against a deadline.
///
/// Pure and side-effect free; call it as often as needed with hypothetical
/// completion instants.
#[must_use]
pub fn classify(deadline: DateTime<Utc>, completed_at: DateTime<Utc>) -> Outcome {
    let delta = completed_at - deadline;
    let tolerance = TimeDelta::seconds(JUST_IN_TIME_TOLERANCE_SECS);

    if delta > tolerance {
        Outcome::Overrun
    } else if delta >= -tolerance {
        Outcome::JustInTime
    } else if delta <= -TimeDelta::seconds(AHEAD_THRESHOLD_SECS) {
        Outcome::Ahead
    } else {
        Outcome::JustInTime
    }
}
