//! Advocate lifecycle events.
//!
//! Events are immutable facts extracted from the history of the profile
//! tree. The three variants share a base of `UID`, `EventDate` and
//! `FileName`; their own fields use the PascalCase names of the persisted
//! log. Field declaration order matters: it is the order the log has
//! always been written in (variant fields first, base fields last).

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};

/// Timestamp of the change an event was extracted from, with its UTC offset.
pub type EventDate = DateTime<FixedOffset>;

/// Discriminant of an [`AdvocateEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    /// A profile entered the tracked tree.
    Added,
    /// A profile changed content or location.
    Modified,
    /// A profile left the tracked tree.
    Removed,
}

impl EventKind {
    /// All kinds, in type-code order.
    pub const ALL: [Self; 3] = [Self::Added, Self::Modified, Self::Removed];

    /// Wire type code used in the `$type` field of an envelope.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Added => 1,
            Self::Modified => 2,
            Self::Removed => 3,
        }
    }

    /// Resolve a wire type code.
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Added),
            2 => Some(Self::Modified),
            3 => Some(Self::Removed),
            _ => None,
        }
    }

    /// Lowercase display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Historical logs contain `null` where a field could not be parsed.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Payload of an `Added` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvocateAdded {
    /// Display name.
    #[serde(rename = "Name", default, deserialize_with = "null_as_empty")]
    pub name: String,
    /// GitHub user name.
    #[serde(rename = "GitHubUserName", default, deserialize_with = "null_as_empty")]
    pub github_user_name: String,
    /// Team.
    #[serde(rename = "Team", default, deserialize_with = "null_as_empty")]
    pub team: String,
    /// Corporate alias (`ms.author`).
    #[serde(rename = "Alias", default, deserialize_with = "null_as_empty")]
    pub alias: String,
    /// Twitter handle.
    #[serde(rename = "TwitterHandle", default, deserialize_with = "null_as_empty")]
    pub twitter_handle: String,
    /// Stable identity.
    #[serde(rename = "UID", default, deserialize_with = "null_as_empty")]
    pub uid: String,
    /// When the change happened.
    #[serde(rename = "EventDate")]
    pub event_date: EventDate,
    /// Path of the profile file.
    #[serde(rename = "FileName", default, deserialize_with = "null_as_empty")]
    pub file_name: String,
}

/// Payload of a `Modified` event.
///
/// The base `uid` and `file_name` carry the identity *before* the change;
/// every `new_*` field describes the state after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvocateModified {
    /// Display name after the change.
    #[serde(rename = "NewName", default, deserialize_with = "null_as_empty")]
    pub new_name: String,
    /// GitHub user name after the change.
    #[serde(rename = "NewGitHubUserName", default, deserialize_with = "null_as_empty")]
    pub new_github_user_name: String,
    /// Team after the change.
    #[serde(rename = "NewTeam", default, deserialize_with = "null_as_empty")]
    pub new_team: String,
    /// Alias after the change.
    #[serde(rename = "NewAlias", default, deserialize_with = "null_as_empty")]
    pub new_alias: String,
    /// Twitter handle after the change.
    #[serde(rename = "NewTwitterHandle", default, deserialize_with = "null_as_empty")]
    pub new_twitter_handle: String,
    /// Identity after the change.
    #[serde(rename = "NewUID", default, deserialize_with = "null_as_empty")]
    pub new_uid: String,
    /// Path after the change.
    #[serde(rename = "NewFileName", default, deserialize_with = "null_as_empty")]
    pub new_file_name: String,
    /// Identity before the change.
    #[serde(rename = "UID", default, deserialize_with = "null_as_empty")]
    pub uid: String,
    /// When the change happened.
    #[serde(rename = "EventDate")]
    pub event_date: EventDate,
    /// Path before the change.
    #[serde(rename = "FileName", default, deserialize_with = "null_as_empty")]
    pub file_name: String,
}

/// Payload of a `Removed` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvocateRemoved {
    /// Identity of the removed profile.
    #[serde(rename = "UID", default, deserialize_with = "null_as_empty")]
    pub uid: String,
    /// When the change happened.
    #[serde(rename = "EventDate")]
    pub event_date: EventDate,
    /// Path of the removed file.
    #[serde(rename = "FileName", default, deserialize_with = "null_as_empty")]
    pub file_name: String,
}

/// A single entry of the event log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvocateEvent {
    /// A profile was added.
    Added(AdvocateAdded),
    /// A profile was modified or moved.
    Modified(AdvocateModified),
    /// A profile was removed.
    Removed(AdvocateRemoved),
}

impl AdvocateEvent {
    /// The variant discriminant.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Added(_) => EventKind::Added,
            Self::Modified(_) => EventKind::Modified,
            Self::Removed(_) => EventKind::Removed,
        }
    }

    /// Base identity (the old identity for `Modified`).
    #[must_use]
    pub fn uid(&self) -> &str {
        match self {
            Self::Added(e) => &e.uid,
            Self::Modified(e) => &e.uid,
            Self::Removed(e) => &e.uid,
        }
    }

    /// Base path (the old path for `Modified`).
    #[must_use]
    pub fn file_name(&self) -> &str {
        match self {
            Self::Added(e) => &e.file_name,
            Self::Modified(e) => &e.file_name,
            Self::Removed(e) => &e.file_name,
        }
    }

    /// Timestamp of the originating change.
    #[must_use]
    pub const fn event_date(&self) -> EventDate {
        match self {
            Self::Added(e) => e.event_date,
            Self::Modified(e) => e.event_date,
            Self::Removed(e) => e.event_date,
        }
    }
}

impl From<AdvocateAdded> for AdvocateEvent {
    fn from(event: AdvocateAdded) -> Self {
        Self::Added(event)
    }
}

impl From<AdvocateModified> for AdvocateEvent {
    fn from(event: AdvocateModified) -> Self {
        Self::Modified(event)
    }
}

impl From<AdvocateRemoved> for AdvocateEvent {
    fn from(event: AdvocateRemoved) -> Self {
        Self::Removed(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> EventDate {
        DateTime::parse_from_rfc3339("2021-03-04T10:00:00-08:00").unwrap()
    }

    #[test]
    fn test_kind_codes_round_trip() {
        for kind in EventKind::ALL {
            assert_eq!(EventKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(EventKind::from_code(0), None);
        assert_eq!(EventKind::from_code(4), None);
    }

    #[test]
    fn test_base_accessors() {
        let event = AdvocateEvent::from(AdvocateRemoved {
            uid: "abc".to_string(),
            event_date: date(),
            file_name: "advocates/abc.yml".to_string(),
        });
        assert_eq!(event.kind(), EventKind::Removed);
        assert_eq!(event.uid(), "abc");
        assert_eq!(event.file_name(), "advocates/abc.yml");
        assert_eq!(event.event_date(), date());
    }

    #[test]
    fn test_null_fields_decode_as_empty() {
        let json = r#"{"Name":null,"UID":"x","EventDate":"2021-03-04T10:00:00-08:00"}"#;
        let added: AdvocateAdded = serde_json::from_str(json).unwrap();
        assert_eq!(added.name, "");
        assert_eq!(added.github_user_name, "");
        assert_eq!(added.file_name, "");
        assert_eq!(added.uid, "x");
    }

    #[test]
    fn test_modified_field_order() {
        let modified = AdvocateModified {
            new_name: "n".to_string(),
            new_github_user_name: String::new(),
            new_team: String::new(),
            new_alias: String::new(),
            new_twitter_handle: String::new(),
            new_uid: "u2".to_string(),
            new_file_name: "b.yml".to_string(),
            uid: "u1".to_string(),
            event_date: date(),
            file_name: "a.yml".to_string(),
        };
        let value = serde_json::to_value(&modified).unwrap();
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(
            keys,
            vec![
                "NewName",
                "NewGitHubUserName",
                "NewTeam",
                "NewAlias",
                "NewTwitterHandle",
                "NewUID",
                "NewFileName",
                "UID",
                "EventDate",
                "FileName"
            ]
        );
    }
}
