//! Tests for the codec module.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use uuid::Uuid;

use super::*;
use crate::model::{Activity, ActivityStatus, Outcome, Priority, RosterEntry, TeamMember};

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, hour, minute, 0).unwrap()
}

fn ada() -> TeamMember {
    TeamMember::with_id(TeamMember::derived_id("Platform", "Ada"), "Ada", "ada@example.com")
}

fn header() -> String {
    ACTIVITY_COLUMNS.join(",")
}

fn row(fields: &[&str]) -> String {
    format!("{}\n{}\n", header(), fields.join(","))
}

const ID: &str = "6f1c2f7e-4a55-4c3e-9f1b-0d6c2a9e1b11";
const CREATED: &str = "2024-06-03T09:00:00+00:00";
const DEADLINE: &str = "2024-06-03T13:00:00+00:00";

// =============================================================================
// Activity Encode Tests
// =============================================================================

#[test]
fn test_encode_writes_header_and_all_columns() {
    let member = ada();
    let mut activity = Activity::new_with_timestamp("Report, Q2", member.id(), at(13, 0), at(9, 0))
        .with_id(Uuid::parse_str(ID).unwrap())
        .with_description("Say \"done\"")
        .with_priority(Priority::P2)
        .with_manager_email("lead@example.com");
    activity.start_at(at(10, 0)).unwrap();

    let text = encode_activities([&activity], [&member]);
    let mut lines = text.lines();

    assert_eq!(lines.next(), Some(header().as_str()));
    assert_eq!(
        lines.next(),
        Some(
            "6f1c2f7e-4a55-4c3e-9f1b-0d6c2a9e1b11,\"Report, Q2\",\"Say \"\"done\"\"\",Ada,P2,\
             Running,,2024-06-03T09:00:00+00:00,2024-06-03T13:00:00+00:00,\
             2024-06-03T10:00:00+00:00,,lead@example.com"
        )
    );
    assert_eq!(lines.next(), None);
}

#[test]
fn test_encode_empty_collection_is_header_only() {
    let text = encode_activities(&[] as &[Activity], &[] as &[TeamMember]);
    assert_eq!(text, format!("{}\n", header()));
    assert!(decode_activities(&text, &[]).records.is_empty());
}

#[test]
fn test_encode_unknown_assignee_writes_empty_name() {
    let activity = Activity::new_with_timestamp("Orphan", Uuid::new_v4(), at(13, 0), at(9, 0));
    let text = encode_activities([&activity], &[] as &[TeamMember]);

    let decoded = decode_activities(&text, &[ada()]);
    assert!(decoded.records.is_empty());
    assert_eq!(
        decoded.skipped[0].reason,
        SkipReason::UnknownMember {
            name: String::new()
        }
    );
}

// =============================================================================
// Activity Decode Tests
// =============================================================================

#[test]
fn test_decode_round_trips_full_record() {
    let member = ada();
    let mut activity = Activity::new_with_timestamp(
        "Multi\nline name",
        member.id(),
        at(13, 0),
        at(9, 0) + TimeDelta::milliseconds(250),
    )
    .with_description("commas, \"quotes\"")
    .with_priority(Priority::P1);
    activity.start_at(at(9, 30)).unwrap();
    activity
        .request_completion_at(None, at(12, 0))
        .unwrap();

    let text = encode_activities([&activity], [&member]);
    let decoded = decode_activities(&text, &[member]);

    assert!(decoded.is_clean());
    let back = &decoded.records[0];
    assert_eq!(back.id(), activity.id());
    assert_eq!(back.name(), "Multi\nline name");
    assert_eq!(back.description(), activity.description());
    assert_eq!(back.priority(), Priority::P1);
    assert_eq!(back.status(), ActivityStatus::ManagerPending);
    assert_eq!(back.outcome(), Some(Outcome::Ahead));
    assert_eq!(back.created_at(), at(9, 0));
    assert_eq!(back.started_at(), Some(at(9, 30)));
    assert_eq!(back.completed_at(), Some(at(12, 0)));
}

#[test]
fn test_decode_unknown_status_falls_back_to_pending() {
    let text = row(&[ID, "Task", "", "Ada", "P2", "Bogus", "", CREATED, DEADLINE]);
    let decoded = decode_activities(&text, &[ada()]);

    assert!(decoded.is_clean());
    assert_eq!(decoded.records[0].status(), ActivityStatus::TeamMemberPending);
    assert_eq!(decoded.records[0].priority(), Priority::P2);
}

#[test]
fn test_decode_unknown_priority_falls_back_to_lowest() {
    let text = row(&[ID, "Task", "", "Ada", "urgent!", "Running", "", CREATED, DEADLINE]);
    let decoded = decode_activities(&text, &[ada()]);
    assert_eq!(decoded.records[0].priority(), Priority::P4);
}

#[test]
fn test_decode_lowercase_priority() {
    let text = row(&[ID, "Task", "", "Ada", "p3", "Running", "", CREATED, DEADLINE]);
    assert_eq!(
        decode_activities(&text, &[ada()]).records[0].priority(),
        Priority::P3
    );
}

#[test]
fn test_decode_regenerates_bad_id() {
    let text = row(&["not-a-uuid", "Task", "", "Ada", "P1", "Running", "", CREATED, DEADLINE]);
    let decoded = decode_activities(&text, &[ada()]);
    assert_eq!(decoded.records.len(), 1);
    assert_ne!(decoded.records[0].id(), Uuid::nil());

    let text = row(&["", "Task", "", "Ada", "P1", "Running", "", CREATED, DEADLINE]);
    assert_eq!(decode_activities(&text, &[ada()]).records.len(), 1);
}

#[test]
fn test_decode_drops_outcome_for_statuses_without_one() {
    let text = row(&[ID, "Task", "", "Ada", "P1", "Running", "Overrun", CREATED, DEADLINE]);
    assert_eq!(decode_activities(&text, &[ada()]).records[0].outcome(), None);

    let text = row(&[ID, "Task", "", "Ada", "P1", "Completed", "Overrun", CREATED, DEADLINE]);
    assert_eq!(
        decode_activities(&text, &[ada()]).records[0].outcome(),
        Some(Outcome::Overrun)
    );

    let text = row(&[ID, "Task", "", "Ada", "P1", "Completed", "Late", CREATED, DEADLINE]);
    assert_eq!(decode_activities(&text, &[ada()]).records[0].outcome(), None);
}

#[test]
fn test_decode_trailing_columns_may_be_omitted() {
    let text = row(&[ID, "Task", "", "Ada", "P1", "Running", "", CREATED, DEADLINE]);
    let activity = &decode_activities(&text, &[ada()]).records[0];
    assert_eq!(activity.started_at(), None);
    assert_eq!(activity.completed_at(), None);
    assert_eq!(activity.manager_email(), None);
}

#[test]
fn test_decode_skips_short_rows() {
    let text = row(&[ID, "Task", "", "Ada", "P1", "Running", "", CREATED]);
    let decoded = decode_activities(&text, &[ada()]);
    assert!(decoded.records.is_empty());
    assert_eq!(
        decoded.skipped,
        vec![SkippedRow {
            line: 2,
            reason: SkipReason::TooFewColumns {
                found: 8,
                required: MIN_ACTIVITY_COLUMNS
            },
        }]
    );
}

#[test]
fn test_decode_skips_unknown_member_but_keeps_others() {
    let good = [ID, "A", "", "Ada", "P1", "Running", "", CREATED, DEADLINE].join(",");
    let bad = ["", "B", "", "Grace", "P1", "Running", "", CREATED, DEADLINE].join(",");
    let text = format!("{}\n{bad}\n{good}\n", header());

    let decoded = decode_activities(&text, &[ada()]);
    assert_eq!(decoded.records.len(), 1);
    assert_eq!(decoded.records[0].name(), "A");
    assert_eq!(decoded.skipped.len(), 1);
    assert_eq!(decoded.skipped[0].line, 2);
    assert!(matches!(
        &decoded.skipped[0].reason,
        SkipReason::UnknownMember { name } if name == "Grace"
    ));
}

#[test]
fn test_decode_skips_member_name_shared_across_teams() {
    let platform_alex = TeamMember::with_id(
        TeamMember::derived_id("Platform", "Alex"),
        "Alex",
        "alex.p@example.com",
    );
    let mobile_alex = TeamMember::with_id(
        TeamMember::derived_id("Mobile", "Alex"),
        "Alex",
        "alex.m@example.com",
    );
    let activity = Activity::new_with_timestamp("Ship app", mobile_alex.id(), at(13, 0), at(9, 0));
    let members = [platform_alex, mobile_alex];

    let text = encode_activities([&activity], &members);
    let decoded = decode_activities(&text, &members);

    assert!(decoded.records.is_empty());
    assert_eq!(decoded.skipped.len(), 1);
    assert!(matches!(
        &decoded.skipped[0].reason,
        SkipReason::AmbiguousMember { name } if name == "Alex"
    ));
}

#[test]
fn test_decode_tolerates_same_member_listed_twice() {
    let text = row(&[ID, "Task", "", "Ada", "P1", "Running", "", CREATED, DEADLINE]);
    let decoded = decode_activities(&text, &[ada(), ada()]);
    assert!(decoded.is_clean());
    assert_eq!(decoded.records[0].assigned_member(), ada().id());
}

#[test]
fn test_decode_skips_bad_dates() {
    let members = [ada()];

    let text = row(&[ID, "Task", "", "Ada", "P1", "Running", "", "", DEADLINE]);
    assert_eq!(
        decode_activities(&text, &members).skipped[0].reason,
        SkipReason::MissingTimestamp { column: "createdAt" }
    );

    let text = row(&[ID, "Task", "", "Ada", "P1", "Running", "", CREATED, "tomorrow"]);
    assert_eq!(
        decode_activities(&text, &members).skipped[0].reason,
        SkipReason::InvalidTimestamp {
            column: "deadline",
            value: "tomorrow".to_string()
        }
    );

    let text = row(&[
        ID, "Task", "", "Ada", "P1", "Running", "", CREATED, DEADLINE, "soon",
    ]);
    assert!(decode_activities(&text, &members).records.is_empty());
}

#[test]
fn test_decode_accepts_rfc3339_variants() {
    let text = row(&[
        ID,
        "Task",
        "",
        "Ada",
        "P1",
        "Running",
        "",
        "2024-06-03T09:00:00.500Z",
        "2024-06-03T15:00:00+02:00",
    ]);
    let activity = &decode_activities(&text, &[ada()]).records[0];
    assert_eq!(activity.created_at(), at(9, 0) + TimeDelta::milliseconds(500));
    assert_eq!(activity.deadline(), at(13, 0));
}

#[test]
fn test_decode_ignores_blank_lines() {
    let line = [ID, "Task", "", "Ada", "P1", "Running", "", CREATED, DEADLINE].join(",");
    let text = format!("{}\r\n\r\n{line}\r\n\r\n", header());
    let decoded = decode_activities(&text, &[ada()]);
    assert_eq!(decoded.records.len(), 1);
    assert!(decoded.is_clean());
}

// =============================================================================
// Roster Tests
// =============================================================================

#[test]
fn test_roster_round_trip() {
    let entries = vec![
        RosterEntry {
            member: ada(),
            team: "Platform".to_string(),
            manager_email: Some("lead@example.com".to_string()),
        },
        RosterEntry {
            member: TeamMember::with_id(
                TeamMember::derived_id("Mobile, iOS", "Grace"),
                "Grace",
                "grace@example.com",
            ),
            team: "Mobile, iOS".to_string(),
            manager_email: None,
        },
    ];

    let decoded = decode_roster(&encode_roster(&entries));
    assert!(decoded.is_clean());
    assert_eq!(decoded.records, entries);
}

#[test]
fn test_roster_manager_column_is_optional() {
    let decoded = decode_roster("name,team,email\nAda,Platform,ada@example.com\n");
    assert_eq!(decoded.records.len(), 1);
    assert_eq!(decoded.records[0].manager_email, None);
    assert_eq!(decoded.records[0].member.id(), ada().id());
}

#[test]
fn test_roster_skips_incomplete_rows() {
    let text = "name,team,email,managerEmail\n\
                Ada,Platform\n\
                ,Platform,x@example.com,\n\
                Grace,,g@example.com,\n\
                Linus,Kernel,l@example.com,\n";
    let decoded = decode_roster(text);

    assert_eq!(decoded.records.len(), 1);
    assert_eq!(decoded.records[0].member.name(), "Linus");
    let reasons: Vec<_> = decoded.skipped.iter().map(|s| s.reason.clone()).collect();
    assert_eq!(
        reasons,
        vec![
            SkipReason::TooFewColumns {
                found: 2,
                required: MIN_ROSTER_COLUMNS
            },
            SkipReason::EmptyField { column: "name" },
            SkipReason::EmptyField { column: "team" },
        ]
    );
}

#[test]
fn test_skip_reason_messages() {
    assert_eq!(
        SkipReason::UnknownMember {
            name: "Grace".to_string()
        }
        .to_string(),
        "unknown member: \"Grace\""
    );
    assert_eq!(
        SkipReason::AmbiguousMember {
            name: "Alex".to_string()
        }
        .to_string(),
        "ambiguous member: \"Alex\" matches several team members"
    );
    assert_eq!(
        SkipReason::MissingTimestamp { column: "deadline" }.to_string(),
        "missing deadline timestamp"
    );
}
