//! Property-based tests for the event log codec and the projection fold.
//!
//! These tests verify that:
//! - The decoder never panics on arbitrary input
//! - Encoding then decoding preserves every event
//! - Folding is deterministic and insensitive to log order

use advocate_events::codec;
use advocate_events::model::{
    AdvocateAdded, AdvocateEvent, AdvocateModified, AdvocateRemoved, CurrentAdvocate,
    DashboardAdvocate, EventDate,
};
use advocate_events::projection::ProjectionEngine;
use chrono::{DateTime, Duration};
use proptest::prelude::*;

fn base_date() -> EventDate {
    DateTime::parse_from_rfc3339("2018-01-01T00:00:00-08:00").unwrap()
}

/// Whole-second dates: the log never carries sub-second precision.
fn arb_date() -> impl Strategy<Value = EventDate> {
    (0i64..100_000_000).prop_map(|secs| base_date() + Duration::seconds(secs))
}

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), "[a-zA-Z0-9 ._-]{1,16}", "\\PC{0,12}"]
}

fn arb_uid() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), "advocates\\.[a-c]"]
}

fn arb_file() -> impl Strategy<Value = String> {
    "advocates/[a-c]\\.yml"
}

fn arb_event() -> impl Strategy<Value = AdvocateEvent> {
    let added = (
        arb_text(),
        arb_text(),
        arb_text(),
        arb_text(),
        arb_text(),
        arb_uid(),
        arb_date(),
        arb_file(),
    )
        .prop_map(
            |(name, github_user_name, team, alias, twitter_handle, uid, event_date, file_name)| {
                AdvocateEvent::from(AdvocateAdded {
                    name,
                    github_user_name,
                    team,
                    alias,
                    twitter_handle,
                    uid,
                    event_date,
                    file_name,
                })
            },
        );

    let modified = (
        (arb_text(), arb_text(), arb_text(), arb_text(), arb_text()),
        (arb_uid(), arb_file(), arb_uid(), arb_date(), arb_file()),
    )
        .prop_map(
            |(
                (new_name, new_github_user_name, new_team, new_alias, new_twitter_handle),
                (new_uid, new_file_name, uid, event_date, file_name),
            )| {
                AdvocateEvent::from(AdvocateModified {
                    new_name,
                    new_github_user_name,
                    new_team,
                    new_alias,
                    new_twitter_handle,
                    new_uid,
                    new_file_name,
                    uid,
                    event_date,
                    file_name,
                })
            },
        );

    let removed = (arb_uid(), arb_date(), arb_file()).prop_map(|(uid, event_date, file_name)| {
        AdvocateEvent::from(AdvocateRemoved {
            uid,
            event_date,
            file_name,
        })
    });

    prop_oneof![added, modified, removed]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The decoder never panics on arbitrary strings.
    #[test]
    fn decode_never_panics(input in "\\PC{0,200}") {
        let _ = codec::decode(&input);
    }

    /// The decoder never panics on arbitrary envelope-shaped JSON.
    #[test]
    fn decode_envelope_shapes_never_panic(
        tag in prop_oneof![Just("1".to_string()), Just("2".to_string()), Just("3".to_string()), "-?[0-9]{1,4}", Just("\"1\"".to_string()), Just("null".to_string())],
        payload in prop_oneof![Just("{}".to_string()), Just("[]".to_string()), Just("null".to_string()), Just(r#"{"UID":null,"EventDate":"2020-01-01T00:00:00+00:00"}"#.to_string())],
    ) {
        let log = format!(r#"[{{"$type":{tag},"AdvocateEvent":{payload}}}]"#);
        let _ = codec::decode(&log);
    }

    /// Encoding then decoding preserves every event.
    #[test]
    fn round_trip(events in prop::collection::vec(arb_event(), 0..20)) {
        let decoded = codec::decode(&codec::encode(&events).unwrap()).unwrap();
        prop_assert_eq!(decoded, events);
    }

    /// Folding the same log twice gives the same result.
    #[test]
    fn fold_is_deterministic(events in prop::collection::vec(arb_event(), 0..30)) {
        let first = ProjectionEngine::fold::<CurrentAdvocate>(&events);
        let second = ProjectionEngine::fold::<CurrentAdvocate>(&events);
        prop_assert_eq!(first.items, second.items);
        prop_assert_eq!(first.diagnostics, second.diagnostics);
    }

    /// With distinct dates, the array order of the log does not matter.
    #[test]
    fn fold_ignores_log_order(events in prop::collection::vec(arb_event(), 0..30)) {
        let mut dates: Vec<_> = events.iter().map(AdvocateEvent::event_date).collect();
        dates.sort();
        dates.dedup();
        prop_assume!(dates.len() == events.len());

        let reversed: Vec<_> = events.iter().rev().cloned().collect();
        let forward = ProjectionEngine::fold::<DashboardAdvocate>(&events);
        let backward = ProjectionEngine::fold::<DashboardAdvocate>(&reversed);
        prop_assert_eq!(forward.items, backward.items);
    }

    /// A current-state fold never holds more advocates than Added and
    /// Modified events combined.
    #[test]
    fn current_state_is_bounded(events in prop::collection::vec(arb_event(), 0..30)) {
        let projection = ProjectionEngine::fold::<CurrentAdvocate>(&events);
        let creators = events
            .iter()
            .filter(|e| !matches!(e, AdvocateEvent::Removed(_)))
            .count();
        prop_assert!(projection.items.len() <= creators);
    }
}
