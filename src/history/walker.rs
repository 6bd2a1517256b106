//! Drive classification and event building across a range of history.

use rayon::prelude::*;
use serde::Serialize;

use super::{ChangeClassifier, Cursor, HistorySource, PathChange, Transition};
use crate::error::Result;
use crate::extraction::EventBuilder;
use crate::model::{AdvocateEvent, EventKind};

/// Counters collected during a walk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WalkStats {
    /// Transitions reported by the source.
    pub transitions_seen: usize,
    /// Transitions skipped for not having exactly one parent.
    pub transitions_skipped: usize,
    /// Changes that produced an event.
    pub changes_retained: usize,
    /// Changes dropped by the path filter.
    pub changes_filtered: usize,
    /// Changes dropped for an unsupported status.
    pub changes_unknown: usize,
    /// `Added` events built.
    pub added: usize,
    /// `Modified` events built.
    pub modified: usize,
    /// `Removed` events built.
    pub removed: usize,
}

impl WalkStats {
    fn record(&mut self, kind: EventKind) {
        match kind {
            EventKind::Added => self.added += 1,
            EventKind::Modified => self.modified += 1,
            EventKind::Removed => self.removed += 1,
        }
    }

    /// Total events built.
    #[must_use]
    pub const fn events(&self) -> usize {
        self.added + self.modified + self.removed
    }
}

/// Result of a walk.
#[derive(Debug, Clone, Default)]
pub struct WalkOutcome {
    /// Events in transition order, then provider path order.
    pub events: Vec<AdvocateEvent>,
    /// Last transition of the walked range, merges included. `None` when
    /// the range was empty.
    pub cursor: Option<Cursor>,
    /// Walk counters.
    pub stats: WalkStats,
}

/// Walks a [`HistorySource`] oldest-first and builds one event per
/// retained change.
pub struct CommitWalker<S> {
    source: S,
    classifier: ChangeClassifier,
    builder: EventBuilder,
}

impl<S: HistorySource> CommitWalker<S> {
    /// Create a walker over `source`.
    pub fn new(source: S, classifier: ChangeClassifier, builder: EventBuilder) -> Self {
        Self {
            source,
            classifier,
            builder,
        }
    }

    /// The underlying source.
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Walk every transition after `since` (the whole history when `None`).
    ///
    /// Any fetch failure aborts the walk; no partial outcome is returned.
    pub fn walk(&self, since: Option<&Cursor>) -> Result<WalkOutcome> {
        let transitions = self.source.transitions(since)?;
        tracing::info!(
            source = %self.source.describe(),
            since = since.map(Cursor::as_str),
            transitions = transitions.len(),
            "Walking history"
        );

        let mut outcome = WalkOutcome {
            cursor: transitions.last().map(|t| Cursor::new(t.id.clone())),
            ..WalkOutcome::default()
        };

        for transition in &transitions {
            outcome.stats.transitions_seen += 1;

            let Some(parent) = transition.sole_parent() else {
                tracing::debug!(
                    id = %transition.id,
                    parents = transition.parents.len(),
                    "Skipping transition without a single parent"
                );
                outcome.stats.transitions_skipped += 1;
                continue;
            };

            let classification = self.classifier.classify(&transition.changes);
            outcome.stats.changes_filtered += classification.filtered;
            outcome.stats.changes_unknown += classification.unknown;
            outcome.stats.changes_retained += classification.changes.len();

            let events = self.build_transition(transition, parent, &classification.changes)?;
            for event in &events {
                outcome.stats.record(event.kind());
            }
            if !events.is_empty() {
                tracing::debug!(id = %transition.id, events = events.len(), "Transition processed");
            }
            outcome.events.extend(events);
        }

        tracing::info!(
            events = outcome.stats.events(),
            skipped = outcome.stats.transitions_skipped,
            cursor = outcome.cursor.as_ref().map(Cursor::as_str),
            "Walk complete"
        );
        Ok(outcome)
    }

    /// Fetch contents in parallel, keeping the provider's path order.
    fn build_transition(
        &self,
        transition: &Transition,
        parent: &str,
        changes: &[PathChange],
    ) -> Result<Vec<AdvocateEvent>> {
        changes
            .par_iter()
            .map(|change| {
                let request = self.builder.required_content(change);
                let before = request
                    .before
                    .as_deref()
                    .map(|path| self.source.read_file(parent, path))
                    .transpose()?;
                let after = request
                    .after
                    .as_deref()
                    .map(|path| self.source.read_file(&transition.id, path))
                    .transpose()?;
                Ok(self.builder.build(
                    change,
                    before.as_deref(),
                    after.as_deref(),
                    transition.timestamp,
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::DateTime;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::AdvocateError;
    use crate::history::RawChange;
    use crate::model::EventDate;

    /// In-memory history: transitions plus a (revision, path) -> content map.
    struct FakeHistory {
        transitions: Vec<Transition>,
        files: HashMap<(String, String), String>,
    }

    impl FakeHistory {
        fn new() -> Self {
            Self {
                transitions: Vec::new(),
                files: HashMap::new(),
            }
        }

        fn commit(
            mut self,
            id: &str,
            parents: &[&str],
            date: &str,
            changes: Vec<RawChange>,
            files: &[(&str, &str)],
        ) -> Self {
            self.transitions.push(Transition {
                id: id.to_string(),
                parents: parents.iter().map(|p| (*p).to_string()).collect(),
                timestamp: date_at(date),
                changes,
            });
            for (path, content) in files {
                self.files
                    .insert((id.to_string(), (*path).to_string()), (*content).to_string());
            }
            self
        }
    }

    impl HistorySource for FakeHistory {
        fn transitions(&self, since: Option<&Cursor>) -> Result<Vec<Transition>> {
            let start = match since {
                Some(cursor) => self
                    .transitions
                    .iter()
                    .position(|t| t.id == cursor.as_str())
                    .map_or(0, |i| i + 1),
                None => 0,
            };
            Ok(self.transitions[start..].to_vec())
        }

        fn read_file(&self, revision: &str, path: &str) -> Result<String> {
            self.files
                .get(&(revision.to_string(), path.to_string()))
                .cloned()
                .ok_or_else(|| AdvocateError::git(format!("show {revision}:{path}"), "missing"))
        }

        fn describe(&self) -> String {
            "fake".to_string()
        }
    }

    fn date_at(s: &str) -> EventDate {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn walker(history: FakeHistory) -> CommitWalker<FakeHistory> {
        CommitWalker::new(history, ChangeClassifier::default(), EventBuilder::default())
    }

    fn sample() -> FakeHistory {
        FakeHistory::new()
            .commit("c0", &[], "2020-01-01T00:00:00Z", vec![], &[])
            .commit(
                "c1",
                &["c0"],
                "2020-01-02T00:00:00Z",
                vec![
                    RawChange::new("A", "advocates/a.yml"),
                    RawChange::new("A", "advocates/toc.yml"),
                ],
                &[("advocates/a.yml", "uid: a\nname: A\n")],
            )
            .commit(
                "c2",
                &["c1"],
                "2020-01-03T00:00:00Z",
                vec![RawChange::new("R100", "advocates/b.yml").with_previous("advocates/a.yml")],
                &[("advocates/b.yml", "uid: b\nname: B\n")],
            )
            .commit("m1", &["c2", "x"], "2020-01-04T00:00:00Z", vec![], &[])
    }

    #[test]
    fn test_walk_builds_events_and_cursor() {
        let outcome = walker(sample()).walk(None).unwrap();

        assert_eq!(outcome.events.len(), 2);
        assert_eq!(outcome.events[0].kind(), EventKind::Added);
        let AdvocateEvent::Modified(modified) = &outcome.events[1] else {
            panic!("expected Modified");
        };
        assert_eq!(modified.uid, "a");
        assert_eq!(modified.file_name, "advocates/a.yml");
        assert_eq!(modified.new_uid, "b");
        assert_eq!(modified.new_file_name, "advocates/b.yml");

        assert_eq!(outcome.cursor, Some(Cursor::new("m1")));
        assert_eq!(outcome.stats.transitions_seen, 4);
        assert_eq!(outcome.stats.transitions_skipped, 2);
        assert_eq!(outcome.stats.changes_filtered, 1);
        assert_eq!(outcome.stats.added, 1);
        assert_eq!(outcome.stats.modified, 1);
    }

    #[test]
    fn test_walk_since_cursor() {
        let outcome = walker(sample()).walk(Some(&Cursor::new("c1"))).unwrap();
        assert_eq!(outcome.events.len(), 1);
        assert_eq!(outcome.events[0].kind(), EventKind::Modified);
        assert_eq!(outcome.events[0].event_date(), date_at("2020-01-03T00:00:00Z"));
    }

    #[test]
    fn test_empty_range_has_no_cursor() {
        let outcome = walker(sample()).walk(Some(&Cursor::new("m1"))).unwrap();
        assert!(outcome.events.is_empty());
        assert_eq!(outcome.cursor, None);
    }

    #[test]
    fn test_fetch_failure_aborts_walk() {
        let history = FakeHistory::new().commit(
            "c1",
            &["c0"],
            "2020-01-02T00:00:00Z",
            vec![RawChange::new("D", "advocates/gone.yml")],
            &[],
        );
        assert!(walker(history).walk(None).is_err());
    }

    #[test]
    fn test_events_keep_path_order() {
        let names: Vec<String> = (0..20).map(|i| format!("advocates/p{i:02}.yml")).collect();
        let changes = names.iter().map(|n| RawChange::new("A", n.as_str())).collect();
        let contents: Vec<(String, String)> = names
            .iter()
            .map(|n| (n.clone(), format!("uid: {n}\n")))
            .collect();
        let files: Vec<(&str, &str)> = contents
            .iter()
            .map(|(p, c)| (p.as_str(), c.as_str()))
            .collect();
        let history =
            FakeHistory::new().commit("c1", &["c0"], "2020-01-02T00:00:00Z", changes, &files);

        let outcome = walker(history).walk(None).unwrap();
        let uids: Vec<&str> = outcome.events.iter().map(AdvocateEvent::uid).collect();
        let expected: Vec<&str> = names.iter().map(String::as_str).collect();
        assert_eq!(uids, expected);
    }
}
