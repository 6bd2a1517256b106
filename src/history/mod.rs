//! History traversal: from snapshot transitions to advocate events.
//!
//! A [`HistorySource`] reports the transitions of the profile tree
//! (commits, oldest first) together with the raw per-path changes of each.
//! The [`ChangeClassifier`] keeps only profile changes and normalizes their
//! kind, and the [`CommitWalker`] drives classification and event building
//! over a whole range, bookmarking where it stopped with a [`Cursor`].

mod classify;
mod walker;

pub use classify::*;
pub use walker::*;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::EventDate;

/// Opaque bookmark of the last transition reflected in the event log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Wrap a snapshot identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parse the persisted single-line form. Blank input has no cursor.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let id = text.trim();
        if id.is_empty() {
            None
        } else {
            Some(Self(id.to_string()))
        }
    }

    /// The snapshot identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One path change as the provider reported it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawChange {
    /// Path after the change (the removed path for deletions).
    pub path: String,
    /// Path before a rename or copy.
    pub previous_path: Option<String>,
    /// Provider status, e.g. `A`, `R100`, `removed`, `renamed`.
    pub status: String,
}

impl RawChange {
    /// Convenience constructor.
    #[must_use]
    pub fn new(status: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            previous_path: None,
            status: status.into(),
        }
    }

    /// Set the pre-change path.
    #[must_use]
    pub fn with_previous(mut self, previous: impl Into<String>) -> Self {
        self.previous_path = Some(previous.into());
        self
    }
}

/// One step of history: a snapshot and how it differs from its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Snapshot identifier (commit SHA).
    pub id: String,
    /// Parent snapshot identifiers.
    pub parents: Vec<String>,
    /// When the change was made.
    pub timestamp: EventDate,
    /// Per-path changes against the single parent. Empty for merges and
    /// root commits, which are never classified.
    pub changes: Vec<RawChange>,
}

impl Transition {
    /// The single parent, if this transition has exactly one.
    #[must_use]
    pub fn sole_parent(&self) -> Option<&str> {
        match self.parents.as_slice() {
            [parent] => Some(parent.as_str()),
            _ => None,
        }
    }
}

/// Provider of commits, diffs and file contents.
///
/// Implementations must be shareable across threads: the walker fetches
/// the contents of one transition in parallel.
pub trait HistorySource: Send + Sync {
    /// Transitions after `since` (all of them when `None`), oldest first in
    /// topological order.
    fn transitions(&self, since: Option<&Cursor>) -> Result<Vec<Transition>>;

    /// Content of `path` at `revision`.
    fn read_file(&self, revision: &str, path: &str) -> Result<String>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

impl<S: HistorySource + ?Sized> HistorySource for &S {
    fn transitions(&self, since: Option<&Cursor>) -> Result<Vec<Transition>> {
        (**self).transitions(since)
    }

    fn read_file(&self, revision: &str, path: &str) -> Result<String> {
        (**self).read_file(revision, path)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Drop a leading UTF-8 byte order mark.
#[must_use]
pub fn strip_bom(text: String) -> String {
    match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    }
}
