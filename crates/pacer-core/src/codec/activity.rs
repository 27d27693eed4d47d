//! Activity rows.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use super::flat::{Record, read_records, write_record};
use super::{Decoded, SkipReason, SkippedRow};
use crate::model::{Activity, ActivityStatus, MemberId, Outcome, Priority, TeamMember};

/// Column order of the activity format.
pub const ACTIVITY_COLUMNS: [&str; 12] = [
    "id",
    "name",
    "description",
    "memberName",
    "priority",
    "status",
    "outcome",
    "createdAt",
    "deadline",
    "startedAt",
    "completedAt",
    "managerEmail",
];

/// Rows must reach the `deadline` column to be accepted.
pub const MIN_ACTIVITY_COLUMNS: usize = 9;

/// `chrono` format of every timestamp field: whole seconds with an
/// explicit offset, e.g. `2024-06-03T17:00:00+00:00`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

const COL_ID: usize = 0;
const COL_NAME: usize = 1;
const COL_DESCRIPTION: usize = 2;
const COL_MEMBER: usize = 3;
const COL_PRIORITY: usize = 4;
const COL_STATUS: usize = 5;
const COL_OUTCOME: usize = 6;
const COL_CREATED: usize = 7;
const COL_DEADLINE: usize = 8;
const COL_STARTED: usize = 9;
const COL_COMPLETED: usize = 10;
const COL_MANAGER_EMAIL: usize = 11;

fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.format(TIMESTAMP_FORMAT).to_string()
}

fn format_optional(instant: Option<DateTime<Utc>>) -> String {
    instant.map(format_timestamp).unwrap_or_default()
}

/// Parses a timestamp field. RFC 3339 input with fractional seconds or a
/// `Z` suffix is also accepted.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn required_timestamp(record: &Record, index: usize) -> Result<DateTime<Utc>, SkipReason> {
    let column = ACTIVITY_COLUMNS[index];
    let value = record.field(index).trim();
    if value.is_empty() {
        return Err(SkipReason::MissingTimestamp { column });
    }
    parse_timestamp(value).ok_or_else(|| SkipReason::InvalidTimestamp {
        column,
        value: value.to_string(),
    })
}

fn optional_timestamp(record: &Record, index: usize) -> Result<Option<DateTime<Utc>>, SkipReason> {
    let value = record.field(index).trim();
    if value.is_empty() {
        return Ok(None);
    }
    parse_timestamp(value)
        .map(Some)
        .ok_or_else(|| SkipReason::InvalidTimestamp {
            column: ACTIVITY_COLUMNS[index],
            value: value.to_string(),
        })
}

/// Encodes activities as a header row followed by one row per activity.
///
/// `members` resolves each assignee id to the name written in the
/// `memberName` column. An assignee missing from `members` is written with
/// an empty name and will not survive a decode, and neither will one whose
/// name is shared by a different member.
#[must_use]
pub fn encode_activities<'a, A, M>(activities: A, members: M) -> String
where
    A: IntoIterator<Item = &'a Activity>,
    M: IntoIterator<Item = &'a TeamMember>,
{
    let mut names: HashMap<MemberId, &str> = HashMap::new();
    let mut owners: HashMap<&str, MemberId> = HashMap::new();
    let mut shared: HashSet<&str> = HashSet::new();
    for member in members {
        names.insert(member.id(), member.name());
        if *owners.entry(member.name()).or_insert(member.id()) != member.id() {
            shared.insert(member.name());
        }
    }

    let mut out = String::new();
    write_record(&mut out, ACTIVITY_COLUMNS);
    for activity in activities {
        let member_name = names
            .get(&activity.assigned_member())
            .copied()
            .unwrap_or_else(|| {
                warn!(
                    activity_id = %activity.id(),
                    member_id = %activity.assigned_member(),
                    "encoding activity with unknown assignee"
                );
                ""
            });
        if shared.contains(member_name) {
            warn!(
                activity_id = %activity.id(),
                member = member_name,
                "encoding activity whose assignee name is shared by another member"
            );
        }

        write_record(
            &mut out,
            [
                activity.id().to_string(),
                activity.name().to_string(),
                activity.description().to_string(),
                member_name.to_string(),
                activity.priority().as_token().to_string(),
                activity.status().as_label().to_string(),
                activity
                    .outcome()
                    .map(|o| o.as_label().to_string())
                    .unwrap_or_default(),
                format_timestamp(activity.created_at()),
                format_timestamp(activity.deadline()),
                format_optional(activity.started_at()),
                format_optional(activity.completed_at()),
                activity.manager_email().unwrap_or_default().to_string(),
            ],
        );
    }
    out
}

/// Decodes an activity collection.
///
/// The first record is the header and is not interpreted. For each data
/// row:
///
/// - an absent or unparseable `id` is replaced with a fresh one;
/// - `memberName` must match exactly one member in `members`, or the row
///   is skipped;
/// - an unrecognized `priority` becomes [`Priority::P4`] and an
///   unrecognized `status` becomes [`ActivityStatus::TeamMemberPending`];
/// - `outcome` is ignored for statuses that carry none, and an
///   unrecognized label reads as absent;
/// - a missing or unparseable `createdAt`/`deadline`, or an unparseable
///   non-empty `startedAt`/`completedAt`, skips the row.
#[must_use]
pub fn decode_activities(text: &str, members: &[TeamMember]) -> Decoded<Activity> {
    let mut decoded = Decoded::default();
    for record in read_records(text).into_iter().skip(1) {
        match decode_row(&record, members) {
            Ok(activity) => decoded.records.push(activity),
            Err(reason) => {
                warn!(line = record.line, reason = %reason, "skipping activity row");
                decoded.skipped.push(SkippedRow {
                    line: record.line,
                    reason,
                });
            },
        }
    }
    decoded
}

fn decode_row(record: &Record, members: &[TeamMember]) -> Result<Activity, SkipReason> {
    if record.fields.len() < MIN_ACTIVITY_COLUMNS {
        return Err(SkipReason::TooFewColumns {
            found: record.fields.len(),
            required: MIN_ACTIVITY_COLUMNS,
        });
    }

    let member_name = record.field(COL_MEMBER);
    let mut matches = members.iter().filter(|m| m.name() == member_name);
    let member = matches.next().ok_or_else(|| SkipReason::UnknownMember {
        name: member_name.to_string(),
    })?;
    if matches.any(|other| other.id() != member.id()) {
        return Err(SkipReason::AmbiguousMember {
            name: member_name.to_string(),
        });
    }

    let created_at = required_timestamp(record, COL_CREATED)?;
    let deadline = required_timestamp(record, COL_DEADLINE)?;
    let started_at = optional_timestamp(record, COL_STARTED)?;
    let completed_at = optional_timestamp(record, COL_COMPLETED)?;

    let id = Uuid::parse_str(record.field(COL_ID).trim()).unwrap_or_else(|_| Uuid::new_v4());
    let priority = Priority::from_token(record.field(COL_PRIORITY)).unwrap_or_default();
    let status = ActivityStatus::from_label(record.field(COL_STATUS).trim()).unwrap_or_default();
    let outcome = if status.forbids_outcome() {
        None
    } else {
        Outcome::from_label(record.field(COL_OUTCOME).trim())
    };

    let mut activity = Activity::new_with_timestamp(
        record.field(COL_NAME),
        member.id(),
        deadline,
        created_at,
    )
    .with_id(id)
    .with_description(record.field(COL_DESCRIPTION))
    .with_priority(priority)
    .with_manager_email(record.field(COL_MANAGER_EMAIL).trim());
    activity.started_at = started_at;
    activity.completed_at = completed_at;
    activity.status = status;
    activity.outcome = outcome;
    Ok(activity)
}
