//! # pacer-core
//!
//! Activity tracking with a manager-approval workflow.
//!
//! Each [`Activity`] is a time-boxed unit of work assigned to a
//! [`TeamMember`]. It moves through a small lifecycle (pending, running,
//! awaiting approval, then completed or canceled) and, once completion is
//! requested, is classified against its deadline as ahead, just in time, or
//! overrun.
//!
//! ## Modules
//!
//! - [`model`]: members, teams, activities and the client-side
//!   [`Workspace`] tree
//! - [`lifecycle`]: the guarded state machine ([`Transition`])
//! - [`outcome`]: deadline-relative classification ([`classify`])
//! - [`timing`]: derived time metrics ([`ActivityTiming`])
//! - [`codec`]: the flat record format of the shared blobs
//! - [`clock`]: injectable time sources
//! - [`config`]: TOML client configuration
//!
//! Nothing in this crate performs I/O apart from [`PacerConfig::from_file`].
//! Synchronizing a workspace with a shared store lives in `pacer-sync`.
//!
//! ## Example
//!
//! ```rust
//! use chrono::{TimeDelta, TimeZone, Utc};
//! use pacer_core::{Activity, ActivityStatus, ActivityTiming, Outcome, TeamMember};
//!
//! let now = Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap();
//! let ada = TeamMember::new("Ada", "ada@example.com");
//! let mut activity =
//!     Activity::new_with_timestamp("Draft RFC", ada.id(), now + TimeDelta::hours(4), now);
//!
//! activity.start_at(now).unwrap();
//! activity
//!     .request_completion_at(None, now + TimeDelta::hours(2))
//!     .unwrap();
//! assert_eq!(activity.status(), ActivityStatus::ManagerPending);
//! assert_eq!(activity.outcome(), Some(Outcome::Ahead));
//!
//! let timing = ActivityTiming::new(&activity, now + TimeDelta::hours(3));
//! assert_eq!(timing.completion_delta(), Some(TimeDelta::hours(2)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod clock;
pub mod codec;
pub mod config;
pub mod lifecycle;
pub mod model;
pub mod outcome;
pub mod timing;

pub use clock::{Clock, FixedClock, ManualClock, SystemClock};
pub use codec::{Decoded, SkipReason, SkippedRow};
pub use config::{ConfigError, PacerConfig};
pub use lifecycle::{LifecycleError, Transition};
pub use model::{
    Activity, ActivityId, ActivityStatus, MemberId, Outcome, Priority, RosterEntry, Team,
    TeamError, TeamMember, Workspace,
};
pub use outcome::classify;
pub use timing::{ActivityTiming, format_span};
