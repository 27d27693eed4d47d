//! Property-based tests for the record codec and derived metrics.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use pacer_core::codec::{decode_activities, encode_activities};
use pacer_core::outcome::{AHEAD_THRESHOLD_SECS, JUST_IN_TIME_TOLERANCE_SECS};
use pacer_core::{Activity, ActivityTiming, Outcome, Priority, TeamMember, Transition, classify};
use proptest::prelude::*;

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Whole-second instants within roughly three years of the epoch.
fn instant() -> impl Strategy<Value = DateTime<Utc>> {
    (-50_000_000i64..50_000_000).prop_map(|secs| epoch() + TimeDelta::seconds(secs))
}

fn text() -> impl Strategy<Value = String> {
    "[ -~\n,\"]{0,40}"
}

fn transition() -> impl Strategy<Value = Transition> {
    let outcome = prop::option::of(prop::sample::select(Outcome::ALL.to_vec()));
    (0usize..6, outcome).prop_map(|(index, outcome)| match Transition::ALL[index] {
        Transition::RequestCompletion { .. } => Transition::RequestCompletion { outcome },
        Transition::CompleteDirectly { .. } => Transition::CompleteDirectly { outcome },
        other => other,
    })
}

/// Activities reachable through the public lifecycle, with whole-second
/// timestamps.
fn activity(member: TeamMember) -> impl Strategy<Value = Activity> {
    (
        text(),
        text(),
        prop::sample::select(Priority::ALL.to_vec()),
        "[ \t]{0,2}([a-z]{1,8}@example\\.com)?[ \t]{0,2}",
        instant(),
        0i64..1_000_000,
        prop::collection::vec((transition(), 0i64..100_000), 0..8),
    )
        .prop_map(
            move |(name, description, priority, email, created, lead, steps)| {
                let mut activity = Activity::new_with_timestamp(
                    name,
                    member.id(),
                    created + TimeDelta::seconds(lead),
                    created,
                )
                .with_description(description)
                .with_priority(priority)
                .with_manager_email(email);

                let mut now = created;
                for (transition, gap) in steps {
                    now += TimeDelta::seconds(gap);
                    let _ = activity.apply(transition, now);
                }
                activity
            },
        )
}

fn roster() -> Vec<TeamMember> {
    vec![
        TeamMember::with_id(TeamMember::derived_id("Core", "Ada"), "Ada", "ada@example.com"),
        TeamMember::with_id(
            TeamMember::derived_id("Core", "Grace, \"Amazing\""),
            "Grace, \"Amazing\"",
            "grace@example.com",
        ),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Property: every reachable activity survives encode then decode.
    #[test]
    fn prop_activity_round_trip(
        first in activity(roster()[0].clone()),
        second in activity(roster()[1].clone()),
    ) {
        let members = roster();
        let text = encode_activities([&first, &second], &members);
        let decoded = decode_activities(&text, &members);

        prop_assert!(decoded.is_clean(), "skipped: {:?}", decoded.skipped);
        prop_assert_eq!(decoded.records, vec![first, second]);
    }

    /// Property: the decoder never panics and reports every data row it
    /// sees as either accepted or skipped, never more rows than line breaks
    /// allow.
    #[test]
    fn prop_decode_arbitrary_text_is_total(input in "[ -~\n\r,\"]{0,400}") {
        let decoded = decode_activities(&input, &roster());
        let segments = input.split(['\n', '\r']).count();
        prop_assert!(decoded.records.len() + decoded.skipped.len() < segments.max(1));
    }

    /// Property: time progress is always a fraction, whatever the
    /// relationship between start, deadline and now.
    #[test]
    fn prop_time_progress_is_clamped(
        created in instant(),
        deadline in instant(),
        started in prop::option::of(instant()),
        now in instant(),
    ) {
        let mut activity =
            Activity::new_with_timestamp("x", roster()[0].id(), deadline, created);
        if let Some(started) = started {
            activity.start_at(started).unwrap();
        }
        let timing = ActivityTiming::new(&activity, now);

        let progress = timing.time_progress();
        prop_assert!((0.0..=1.0).contains(&progress), "progress {}", progress);
        let remaining = timing.time_remaining_progress();
        prop_assert!((0.0..=1.0).contains(&remaining), "remaining {}", remaining);
    }

    /// Property: classification follows the threshold table for any offset.
    #[test]
    fn prop_classify_matches_thresholds(offset in -200_000i64..200_000) {
        let deadline = epoch();
        let outcome = classify(deadline, deadline + TimeDelta::seconds(offset));
        let expected = if offset > JUST_IN_TIME_TOLERANCE_SECS {
            Outcome::Overrun
        } else if offset <= -AHEAD_THRESHOLD_SECS {
            Outcome::Ahead
        } else {
            Outcome::JustInTime
        };
        prop_assert_eq!(outcome, expected);
    }
}
