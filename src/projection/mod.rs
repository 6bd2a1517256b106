//! Fold the event log into point-in-time views.
//!
//! [`ProjectionEngine::fold`] replays events in `EventDate` order (stable,
//! so equal dates keep log order) into a list of aggregates. Each event is
//! correlated with an existing aggregate by UID or file name, whichever is
//! known; the first aggregate that matches wins.
//!
//! The two views differ only in how an aggregate reacts to events, which
//! the [`Aggregate`] trait captures:
//!
//! - [`CurrentAdvocate`](crate::model::CurrentAdvocate): removed advocates
//!   disappear.
//! - [`DashboardAdvocate`](crate::model::DashboardAdvocate): removed
//!   advocates stay, stamped with a removal date.
//!
//! Lifecycle gaps in the log never abort a fold. A `Modified` without a
//! prior `Added` synthesizes the aggregate; a `Removed` that matches
//! nothing is skipped. Both are reported as [`Diagnostic`]s.

mod current;
mod dashboard;
mod mapping;

pub use mapping::{dedup_mappings, mappings_from_json};

use std::fmt;

use serde::Serialize;

use crate::error::{AdvocateError, Result};
use crate::model::{
    AdvocateAdded, AdvocateEvent, AdvocateMapping, AdvocateModified, AdvocateRemoved,
    DashboardAdvocate, EventDate,
};

/// What happens to an aggregate when its `Removed` event is folded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// Drop it from the view.
    Drop,
    /// Keep it; the aggregate recorded the removal itself.
    Keep,
}

/// A view element rebuilt by folding events.
pub trait Aggregate: Clone + fmt::Debug {
    /// View name used in logs.
    const VIEW: &'static str;

    /// Correlation UID.
    fn uid(&self) -> &str;

    /// Correlation file name.
    fn file_name(&self) -> &str;

    /// Build a new aggregate from an `Added` event.
    fn added(event: &AdvocateAdded) -> Self;

    /// An `Added` event matched this aggregate. Returns whether anything
    /// changed; the default ignores the duplicate.
    fn readded(&mut self, _event: &AdvocateAdded) -> bool {
        false
    }

    /// Empty aggregate for a `Modified` event that matched nothing.
    fn synthesized() -> Self;

    /// Overwrite state with the post-change values of a `Modified` event.
    fn modified(&mut self, event: &AdvocateModified);

    /// React to a matching `Removed` event.
    fn removed(&mut self, event: &AdvocateRemoved) -> Removal;

    /// Whether this aggregate correlates with the given identity. Empty
    /// values never match.
    fn matches(&self, uid: &str, file_name: &str) -> bool {
        (!uid.is_empty() && self.uid() == uid)
            || (!file_name.is_empty() && self.file_name() == file_name)
    }
}

/// A lifecycle gap found while folding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A `Modified` event matched no aggregate; one was synthesized.
    ModifiedWithoutAdded {
        /// Old UID of the event.
        uid: String,
        /// Old file name of the event.
        file_name: String,
        /// When it happened.
        event_date: EventDate,
    },
    /// A `Removed` event matched no aggregate and was skipped.
    RemovedWithoutMatch {
        /// UID of the event.
        uid: String,
        /// File name of the event.
        file_name: String,
        /// When it happened.
        event_date: EventDate,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModifiedWithoutAdded {
                uid,
                file_name,
                event_date,
            } => write!(
                f,
                "modified event without added for '{uid}' ({file_name}) at {event_date}"
            ),
            Self::RemovedWithoutMatch {
                uid,
                file_name,
                event_date,
            } => write!(
                f,
                "removed event for unknown '{uid}' ({file_name}) at {event_date}"
            ),
        }
    }
}

/// Fold counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FoldStats {
    /// Events folded.
    pub events: usize,
    /// Aggregates created by `Added`.
    pub added: usize,
    /// `Added` events that matched an existing aggregate.
    pub readded: usize,
    /// `Modified` events applied.
    pub modified: usize,
    /// Aggregates synthesized for a `Modified` without `Added`.
    pub synthesized: usize,
    /// `Removed` events applied.
    pub removed: usize,
    /// `Removed` events that matched nothing.
    pub unmatched: usize,
}

/// Result of a fold.
#[derive(Debug, Clone)]
pub struct Projection<A> {
    /// Aggregates in first-seen order.
    pub items: Vec<A>,
    /// Lifecycle gaps, in fold order.
    pub diagnostics: Vec<Diagnostic>,
    /// Counters.
    pub stats: FoldStats,
}

impl<A: Aggregate + Serialize> Projection<A> {
    /// Serialize the items as a JSON array.
    pub fn to_json(&self) -> Result<String> {
        to_json_array(&self.items)
    }
}

impl<A> Projection<A>
where
    for<'a> AdvocateMapping: From<&'a A>,
{
    /// De-duplicated account mappings of the items.
    #[must_use]
    pub fn mappings(&self) -> Vec<AdvocateMapping> {
        dedup_mappings(self.items.iter().map(AdvocateMapping::from))
    }
}

impl Projection<DashboardAdvocate> {
    /// Rows the dashboard shows: alias and GitHub user name both known.
    #[must_use]
    pub fn publishable(&self) -> Vec<&DashboardAdvocate> {
        self.items.iter().filter(|a| a.is_publishable()).collect()
    }

    /// Serialize only the publishable rows.
    pub fn publishable_json(&self) -> Result<String> {
        to_json_array(&self.publishable())
    }
}

fn to_json_array<T: Serialize + ?Sized>(items: &T) -> Result<String> {
    serde_json::to_string(items).map_err(|e| AdvocateError::SerializationError {
        context: "Failed to serialize projection".to_string(),
        source: e,
    })
}

/// Replays events into aggregates.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectionEngine;

impl ProjectionEngine {
    /// Fold `events` into a fresh view.
    ///
    /// Events are ordered by `EventDate` first, so the order of the input
    /// slice only decides ties.
    pub fn fold<A: Aggregate>(events: &[AdvocateEvent]) -> Projection<A> {
        let mut ordered: Vec<&AdvocateEvent> = events.iter().collect();
        ordered.sort_by_key(|event| event.event_date());

        let mut fold = Fold::<A>::default();
        for event in ordered {
            fold.apply(event);
        }

        tracing::info!(
            view = A::VIEW,
            events = fold.stats.events,
            items = fold.items.len(),
            diagnostics = fold.diagnostics.len(),
            "Fold complete"
        );

        Projection {
            items: fold.items,
            diagnostics: fold.diagnostics,
            stats: fold.stats,
        }
    }
}

struct Fold<A> {
    items: Vec<A>,
    diagnostics: Vec<Diagnostic>,
    stats: FoldStats,
}

impl<A> Default for Fold<A> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            diagnostics: Vec::new(),
            stats: FoldStats::default(),
        }
    }
}

impl<A: Aggregate> Fold<A> {
    fn position(&self, uid: &str, file_name: &str) -> Option<usize> {
        self.items.iter().position(|a| a.matches(uid, file_name))
    }

    fn apply(&mut self, event: &AdvocateEvent) {
        self.stats.events += 1;
        match event {
            AdvocateEvent::Added(added) => self.apply_added(added),
            AdvocateEvent::Modified(modified) => self.apply_modified(modified),
            AdvocateEvent::Removed(removed) => self.apply_removed(removed),
        }
    }

    fn apply_added(&mut self, event: &AdvocateAdded) {
        match self.position(&event.uid, &event.file_name) {
            Some(index) => {
                self.stats.readded += 1;
                if self.items[index].readded(event) {
                    tracing::debug!(view = A::VIEW, uid = %event.uid, "Aggregate reactivated");
                }
            }
            None => {
                self.stats.added += 1;
                self.items.push(A::added(event));
            }
        }
    }

    fn apply_modified(&mut self, event: &AdvocateModified) {
        self.stats.modified += 1;
        let index = self
            .position(&event.uid, &event.file_name)
            .or_else(|| self.position(&event.new_uid, &event.new_file_name));

        let index = match index {
            Some(index) => index,
            None => {
                let diagnostic = Diagnostic::ModifiedWithoutAdded {
                    uid: event.uid.clone(),
                    file_name: event.file_name.clone(),
                    event_date: event.event_date,
                };
                tracing::warn!(view = A::VIEW, "{diagnostic}");
                self.diagnostics.push(diagnostic);
                self.stats.synthesized += 1;
                self.items.push(A::synthesized());
                self.items.len() - 1
            }
        };

        self.items[index].modified(event);
    }

    fn apply_removed(&mut self, event: &AdvocateRemoved) {
        let Some(index) = self.position(&event.uid, &event.file_name) else {
            let diagnostic = Diagnostic::RemovedWithoutMatch {
                uid: event.uid.clone(),
                file_name: event.file_name.clone(),
                event_date: event.event_date,
            };
            tracing::warn!(view = A::VIEW, "{diagnostic}");
            self.diagnostics.push(diagnostic);
            self.stats.unmatched += 1;
            return;
        };

        self.stats.removed += 1;
        if self.items[index].removed(event) == Removal::Drop {
            self.items.remove(index);
        }
    }
}
