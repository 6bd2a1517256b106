//! Turn one classified path change into one advocate event.
//!
//! The builder is state-free. It decides which file versions a change
//! needs ([`EventBuilder::required_content`]) and, given those versions,
//! produces the event ([`EventBuilder::build`]).

use std::path::Path;

use super::fields::{FieldExtractor, ProfileFields};
use crate::history::{ChangeKind, PathChange};
use crate::model::{
    AdvocateAdded, AdvocateEvent, AdvocateModified, AdvocateRemoved, EventDate,
};

/// Extensions of the pre-profile content format. Renaming one of these to
/// a tracked extension means the profile is new, not moved.
const LEGACY_SOURCE_EXTENSIONS: &[&str] = &["md", ""];

/// File versions a change needs before it can become an event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentRequest {
    /// Path to read at the parent snapshot.
    pub before: Option<String>,
    /// Path to read at the transition's own snapshot.
    pub after: Option<String>,
}

/// Maps classified changes to events.
#[derive(Debug, Clone, Default)]
pub struct EventBuilder {
    extractor: FieldExtractor,
}

impl EventBuilder {
    /// Create a builder around a field extractor.
    #[must_use]
    pub fn new(extractor: FieldExtractor) -> Self {
        Self { extractor }
    }

    /// The extractor in use.
    #[must_use]
    pub const fn extractor(&self) -> &FieldExtractor {
        &self.extractor
    }

    /// Which file versions [`build`](Self::build) will read for `change`.
    #[must_use]
    pub fn required_content(&self, change: &PathChange) -> ContentRequest {
        match change.kind {
            ChangeKind::Added => ContentRequest {
                before: None,
                after: Some(change.path.clone()),
            },
            ChangeKind::Deleted => ContentRequest {
                before: Some(change.path.clone()),
                after: None,
            },
            ChangeKind::Modified => ContentRequest {
                before: Some(change.previous_or_current().to_string()),
                after: Some(change.path.clone()),
            },
            ChangeKind::Renamed => {
                if is_legacy_source(change.previous_or_current()) {
                    ContentRequest {
                        before: None,
                        after: Some(change.path.clone()),
                    }
                } else {
                    ContentRequest {
                        before: Some(change.previous_or_current().to_string()),
                        after: Some(change.path.clone()),
                    }
                }
            }
        }
    }

    /// Build the event for `change`.
    ///
    /// `before` and `after` are the contents named by
    /// [`required_content`](Self::required_content); a missing version reads
    /// as empty text, which yields empty fields.
    #[must_use]
    pub fn build(
        &self,
        change: &PathChange,
        before: Option<&str>,
        after: Option<&str>,
        timestamp: EventDate,
    ) -> AdvocateEvent {
        let before = before.unwrap_or_default();
        let after = after.unwrap_or_default();

        match change.kind {
            ChangeKind::Added => self.added(&change.path, after, timestamp).into(),
            ChangeKind::Deleted => AdvocateRemoved {
                uid: FieldExtractor::read_uid(before),
                event_date: timestamp,
                file_name: change.path.clone(),
            }
            .into(),
            ChangeKind::Modified => self
                .modified(change.previous_or_current(), before, &change.path, after, timestamp)
                .into(),
            ChangeKind::Renamed => {
                let previous = change.previous_or_current();
                if is_legacy_source(previous) {
                    self.added(&change.path, after, timestamp).into()
                } else {
                    self.modified(previous, before, &change.path, after, timestamp)
                        .into()
                }
            }
        }
    }

    fn added(&self, path: &str, content: &str, timestamp: EventDate) -> AdvocateAdded {
        let ProfileFields {
            uid,
            name,
            alias,
            team,
            github_user_name,
            twitter_handle,
        } = self.extractor.extract(content);

        AdvocateAdded {
            name,
            github_user_name,
            team,
            alias,
            twitter_handle,
            uid,
            event_date: timestamp,
            file_name: path.to_string(),
        }
    }

    fn modified(
        &self,
        old_path: &str,
        old_content: &str,
        new_path: &str,
        new_content: &str,
        timestamp: EventDate,
    ) -> AdvocateModified {
        let new = self.extractor.extract(new_content);
        AdvocateModified {
            new_name: new.name,
            new_github_user_name: new.github_user_name,
            new_team: new.team,
            new_alias: new.alias,
            new_twitter_handle: new.twitter_handle,
            new_uid: new.uid,
            new_file_name: new_path.to_string(),
            uid: FieldExtractor::read_uid(old_content),
            event_date: timestamp,
            file_name: old_path.to_string(),
        }
    }
}

/// Whether a rename source had a non-profile extension (`.md` or none).
fn is_legacy_source(path: &str) -> bool {
    let extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");
    LEGACY_SOURCE_EXTENSIONS.contains(&extension)
}
