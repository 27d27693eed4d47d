//! Membership rows.

use tracing::warn;

use super::flat::{Record, read_records, write_record};
use super::{Decoded, SkipReason, SkippedRow};
use crate::model::{RosterEntry, TeamMember};

/// Column order of the membership format.
pub const ROSTER_COLUMNS: [&str; 4] = ["name", "team", "email", "managerEmail"];

/// `managerEmail` may be omitted by older writers.
pub const MIN_ROSTER_COLUMNS: usize = 3;

/// Encodes membership rows with a header.
#[must_use]
pub fn encode_roster(entries: &[RosterEntry]) -> String {
    let mut out = String::new();
    write_record(&mut out, ROSTER_COLUMNS);
    for entry in entries {
        write_record(
            &mut out,
            [
                entry.member.name(),
                entry.team.as_str(),
                entry.member.email(),
                entry.manager_email.as_deref().unwrap_or_default(),
            ],
        );
    }
    out
}

/// Decodes membership rows.
///
/// The format has no id column; each member's id is derived from its team
/// and name with [`TeamMember::derived_id`], so repeated decodes agree.
/// Rows with an empty name or team are skipped.
#[must_use]
pub fn decode_roster(text: &str) -> Decoded<RosterEntry> {
    let mut decoded = Decoded::default();
    for record in read_records(text).into_iter().skip(1) {
        match decode_row(&record) {
            Ok(entry) => decoded.records.push(entry),
            Err(reason) => {
                warn!(line = record.line, reason = %reason, "skipping membership row");
                decoded.skipped.push(SkippedRow {
                    line: record.line,
                    reason,
                });
            },
        }
    }
    decoded
}

fn decode_row(record: &Record) -> Result<RosterEntry, SkipReason> {
    if record.fields.len() < MIN_ROSTER_COLUMNS {
        return Err(SkipReason::TooFewColumns {
            found: record.fields.len(),
            required: MIN_ROSTER_COLUMNS,
        });
    }

    let name = record.field(0);
    if name.trim().is_empty() {
        return Err(SkipReason::EmptyField { column: "name" });
    }
    let team = record.field(1);
    if team.trim().is_empty() {
        return Err(SkipReason::EmptyField { column: "team" });
    }
    let email = record.field(2).trim();
    let manager_email = record.field(3).trim();

    Ok(RosterEntry {
        member: TeamMember::with_id(TeamMember::derived_id(team, name), name, email),
        team: team.to_string(),
        manager_email: (!manager_email.is_empty()).then(|| manager_email.to_string()),
    })
}
